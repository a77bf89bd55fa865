use std::fmt;

pub const THEME_CLASSES: &str = "nc-theme-base nc-theme-container nc-theme-rounded";

type ClickHandler = Box<dyn Fn() + Send + Sync>;

/// A themed container with an optional click handler.
#[derive(Default)]
pub struct Card {
    class_name: String,
    on_click: Option<ClickHandler>,
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Card")
            .field("class_name", &self.class_name)
            .field("clickable", &self.on_click.is_some())
            .finish()
    }
}

impl Card {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            on_click: None,
        }
    }

    pub fn on_click(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_click = Some(Box::new(handler));
        self
    }

    pub fn class_names(&self) -> String {
        format!("{THEME_CLASSES} nc-card-card {}", self.class_name)
    }

    /// Returns whether a handler ran.
    pub fn click(&self) -> bool {
        match &self.on_click {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }
}
