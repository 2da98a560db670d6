//! Blocking notices and confirmations

/// The seam between client logic and whatever renders it
///
/// Both calls block until the user has answered or dismissed the notice.
pub trait Prompter: Send + Sync {
    /// Ask a yes/no question; `false` means the action must not happen
    fn confirm(&self, question: &str) -> bool;

    /// Show a notice the user has to dismiss
    fn alert(&self, message: &str);
}

impl<P: Prompter + ?Sized> Prompter for &P {
    fn confirm(&self, question: &str) -> bool {
        (**self).confirm(question)
    }

    fn alert(&self, message: &str) {
        (**self).alert(message)
    }
}
