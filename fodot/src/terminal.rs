use std::{cell::RefCell, collections::HashMap};

pub type StyleId = u8;

/// Applies named styles to standard output. A stylus without styles never touches the
/// terminal, which is how `--no-color` is implemented.
pub struct Stylus {
    styles: HashMap<StyleId, Style>,
    term: RefCell<Option<Box<term::StdoutTerminal>>>,
}

impl Stylus {
    pub fn new() -> Self {
        Self {
            styles: HashMap::new(),
            term: RefCell::new(None),
        }
    }

    pub fn insert_style(&mut self, id: StyleId, style: Style) {
        if self.styles.is_empty() {
            self.term = RefCell::new(term::stdout());
        }
        self.styles.insert(id, style);
    }

    pub fn set(&self, id: StyleId) {
        if let Some(style) = self.styles.get(&id) {
            self.with_term(|term| {
                term.reset().ok()?;
                if let Some(color) = style.color {
                    term.fg(color).ok()?;
                }
                if let Some(attr) = style.attr {
                    term.attr(attr).ok()?;
                }
                Some(())
            });
        }
    }

    pub fn clear(&self) {
        self.with_term(|term| term.reset().ok().map(|_| ()));
    }

    // Styling is best-effort: a terminal that rejects a command is left as is.
    fn with_term<F>(&self, f: F)
    where
        F: FnOnce(&mut term::StdoutTerminal) -> Option<()>,
    {
        if let Some(term) = self.term.borrow_mut().as_mut() {
            let _ = f(&mut **term);
        }
    }
}

impl Drop for Stylus {
    fn drop(&mut self) {
        self.clear();
    }
}

#[derive(Clone, Default)]
pub struct Style {
    color: Option<term::color::Color>,
    attr: Option<term::Attr>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn foreground(self, color: term::color::Color) -> Self {
        Self {
            color: Some(color),
            ..self
        }
    }

    pub fn attribute(self, attr: term::Attr) -> Self {
        Self {
            attr: Some(attr),
            ..self
        }
    }
}
