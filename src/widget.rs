#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub allow_html: bool,
    pub search_fields: Vec<String>,
    pub placeholder_value: String,
    pub search_placeholder_value: String,
    pub remove_item_button: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        WidgetConfig {
            allow_html: true,
            search_fields: vec!["value".to_string()],
            placeholder_value: "Add an item".to_string(),
            search_placeholder_value: "This is a search placeholder".to_string(),
            remove_item_button: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetAttachment {
    pub element: String,
    pub config: WidgetConfig,
}
