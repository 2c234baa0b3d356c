//! Code editor buffer. "Running" code is simulated: the output is fixed apart from echoing the
//! first line of the buffer.

use crate::bookmarks::{BookmarkError, BookmarkedQuestion};

/// Sample loaded into a fresh editor.
pub const DEFAULT_CODE: &str = r#"function bubbleSort(arr) {
  const n = arr.length;

  for (let i = 0; i < n; i++) {
    for (let j = 0; j < n - i - 1; j++) {
      if (arr[j] > arr[j + 1]) {
        // Swap elements
        [arr[j], arr[j + 1]] = [arr[j + 1], arr[j]];
      }
    }
  }

  return arr;
}"#;

#[derive(Debug, Clone)]
pub struct Editor {
    code: String,
    output: String,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(DEFAULT_CODE)
    }
}

impl Editor {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            output: String::new(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    /// Replace the buffer with a bookmark's code.
    pub fn load_bookmark(&mut self, bookmark: &BookmarkedQuestion) {
        self.code = bookmark.code.clone();
    }

    /// Produce the simulated run output and keep it as the current output.
    pub fn run(&mut self) -> &str {
        self.output = simulated_output(&self.code);
        &self.output
    }

    pub fn clear(&mut self) {
        self.code.clear();
        self.output.clear();
    }

    /// Bookmark the current buffer. The title must not be blank.
    pub fn bookmark(
        &self,
        title: &str,
        description: &str,
    ) -> Result<BookmarkedQuestion, BookmarkError> {
        BookmarkedQuestion::new(title, self.code.clone(), description)
    }
}

/// Canned execution output for `code`.
pub fn simulated_output(code: &str) -> String {
    let first_line = code.lines().next().unwrap_or("");
    format!(
        "// Output:\n[Running {}]\n[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]\nExecution completed successfully in 0.05s",
        first_line
    )
}
