use serde::{Deserialize, Serialize};

/// An editor component plugin offered by the markdown toolbar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorComponent {
    pub id: String,
    pub label: String,
}

impl EditorComponent {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarButton {
    pub label: &'static str,
    pub icon: &'static str,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub value: String,
    pub caption: String,
    pub class_name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarMenuView {
    pub button: ToolbarButton,
    pub active: bool,
    pub items: Vec<MenuItem>,
}

/// The "Add Component" menu. Items keep plugin registration order.
pub struct ToolbarComponentsMenu<F> {
    plugins: Vec<EditorComponent>,
    disabled: bool,
    active: bool,
    on_item_click: F,
}

impl<F> ToolbarComponentsMenu<F>
where
    F: FnMut(&EditorComponent),
{
    pub fn new(plugins: Vec<EditorComponent>, on_item_click: F) -> Self {
        Self {
            plugins,
            disabled: false,
            active: false,
            on_item_click,
        }
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn toggle(&mut self) {
        self.active = !self.active;
    }

    pub fn hide(&mut self) {
        self.active = false;
    }

    /// Returns false when no plugin has this id.
    pub fn click_item(&mut self, id: &str) -> bool {
        match self.plugins.iter().find(|plugin| plugin.id == id) {
            Some(plugin) => {
                (self.on_item_click)(plugin);
                true
            }
            None => false,
        }
    }

    pub fn render(&self) -> ToolbarMenuView {
        ToolbarMenuView {
            button: ToolbarButton {
                label: "Add Component",
                icon: "plus",
                disabled: self.disabled,
            },
            active: self.active,
            items: self
                .plugins
                .iter()
                .map(|plugin| MenuItem {
                    value: plugin.id.clone(),
                    caption: plugin.label.clone(),
                    class_name: "nc-toolbarComponentsMenu-menuItem",
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plugins() -> Vec<EditorComponent> {
        vec![
            EditorComponent::new("youtube", "Youtube"),
            EditorComponent::new("image", "Image"),
        ]
    }

    #[test]
    fn test_toggle_and_hide() {
        let mut menu = ToolbarComponentsMenu::new(plugins(), |_: &EditorComponent| {});
        assert!(!menu.is_active());
        menu.toggle();
        assert!(menu.render().active);
        menu.toggle();
        assert!(!menu.is_active());
        menu.toggle();
        menu.hide();
        assert!(!menu.is_active());
    }

    #[test]
    fn test_render_lists_plugins_in_order() {
        let mut menu = ToolbarComponentsMenu::new(plugins(), |_: &EditorComponent| {});
        menu.set_disabled(true);
        let view = menu.render();

        assert_eq!(view.button.label, "Add Component");
        assert_eq!(view.button.icon, "plus");
        assert!(view.button.disabled);
        let captions: Vec<_> = view.items.iter().map(|i| i.caption.as_str()).collect();
        assert_eq!(captions, vec!["Youtube", "Image"]);
    }

    #[test]
    fn test_click_passes_plugin() {
        let mut clicked = Vec::new();
        {
            let mut menu = ToolbarComponentsMenu::new(plugins(), |plugin: &EditorComponent| {
                clicked.push(plugin.id.clone())
            });
            assert!(menu.click_item("image"));
            assert!(!menu.click_item("gallery"));
        }
        assert_eq!(clicked, vec!["image".to_string()]);
    }
}
