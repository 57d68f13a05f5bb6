use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::io::FormatRegistry;

/// Shared console sink for the printing stages.
pub type Output = Rc<RefCell<dyn Write>>;

/// What stages need from their surroundings: formats and somewhere to print.
#[derive(Clone)]
pub struct StageContext {
    formats: Rc<FormatRegistry>,
    out: Output,
}

impl StageContext {
    /// Print to standard output.
    pub fn new(formats: Rc<FormatRegistry>) -> Self {
        Self::with_output(formats, Rc::new(RefCell::new(io::stdout())))
    }

    pub fn with_output(formats: Rc<FormatRegistry>, out: Output) -> Self {
        Self { formats, out }
    }

    pub fn formats(&self) -> Rc<FormatRegistry> {
        self.formats.clone()
    }

    /// Write `text` followed by a newline.
    pub fn emit(&self, text: &str) -> io::Result<()> {
        let mut out = self.out.borrow_mut();
        writeln!(out, "{text}")?;
        out.flush()
    }
}

impl Default for StageContext {
    fn default() -> Self {
        Self::new(Rc::new(FormatRegistry::standard()))
    }
}
