//! Code explanation sources. The shipped source is canned: it ignores the code and answers
//! with a fixed bubble-sort walkthrough after a simulated analysis delay.

use crate::config::ExplainerConfig;
use async_trait::async_trait;
use std::time::Duration;

/// Content of the explainer's three tabs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    pub explanation: String,
    pub complexity: String,
    pub optimizations: String,
}

#[async_trait]
pub trait ExplanationSource: Send + Sync {
    async fn explain(&self, code: &str) -> Explanation;
}

/// Static explanation returned after `delay`.
#[derive(Debug, Clone)]
pub struct CannedExplainer {
    delay: Duration,
}

impl CannedExplainer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_config(config: &ExplainerConfig) -> Self {
        Self::new(Duration::from_millis(config.delay_ms))
    }
}

#[async_trait]
impl ExplanationSource for CannedExplainer {
    async fn explain(&self, _code: &str) -> Explanation {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        canned_explanation()
    }
}

pub fn canned_explanation() -> Explanation {
    Explanation {
        explanation: EXPLANATION.trim().to_string(),
        complexity: COMPLEXITY.trim().to_string(),
        optimizations: OPTIMIZATIONS.trim().to_string(),
    }
}

const EXPLANATION: &str = r#"
This code implements the Bubble Sort algorithm, which is a simple sorting algorithm.

Here's how it works:
1. The function takes an array 'arr' as input.
2. It gets the length of the array and stores it in variable 'n'.
3. It uses two nested loops to compare adjacent elements.
4. If an element is greater than the next one, they are swapped.
5. This process continues until the array is sorted.
6. Finally, it returns the sorted array.

Bubble sort gets its name because smaller elements "bubble" to the top of the array with each iteration.
"#;

const COMPLEXITY: &str = r#"
Time Complexity: O(n²)
- Worst case: O(n²) - When the array is in reverse order
- Average case: O(n²)
- Best case: O(n) - When the array is already sorted (with optimization)

Space Complexity: O(1)
- The algorithm sorts in-place, using only a constant amount of extra space.
"#;

const OPTIMIZATIONS: &str = r#"
Possible optimizations:
1. Early termination: Add a flag to check if any swaps were made in an iteration. If no swaps were made, the array is already sorted.

2. Optimized implementation:
```javascript
function optimizedBubbleSort(arr) {
  const n = arr.length;
  let swapped;

  for (let i = 0; i < n; i++) {
    swapped = false;

    // Last i elements are already sorted
    for (let j = 0; j < n - i - 1; j++) {
      if (arr[j] > arr[j + 1]) {
        [arr[j], arr[j + 1]] = [arr[j + 1], arr[j]];
        swapped = true;
      }
    }

    // If no swapping occurred in this pass, array is sorted
    if (!swapped) break;
  }

  return arr;
}
```

3. Consider using more efficient sorting algorithms for large datasets:
   - Quick Sort: O(n log n) average time complexity
   - Merge Sort: O(n log n) worst-case time complexity
   - Heap Sort: O(n log n) worst-case time complexity
"#;
