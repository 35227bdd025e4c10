use super::*;

pub mod markers {
    pub const BULK_UPDATE: &str = "[data-bulk-update]";
    pub const BULK_SELECT_ALL: &str = "[data-bulk-select-all]";
    pub const BULK_ACTION: &str = "[data-bulk-action]";
    pub const BULK_EDIT_MENU: &str = "#sort-bulk-edit";
    pub const STAGE_MENU: &str = "#sort-stage";
    pub const CONDITIONAL_FIELD: &str = "[data-conditional-field]";
    pub const CONDITIONAL_PANEL: &str = ".conditional-field";
    pub const CONDITIONAL_GROUP_ATTR: &str = "data-conditional-group";
    pub const AUTOCOMPLETE: &str = "[data-autocomplete]";
    pub const HIDDEN_CLASS: &str = "d-none";
    pub const MENU_DEFAULT_LABEL: &str = "Bulk update";
    // Fixed literal; the menus do not recount selected rows.
    pub const MENU_SELECTED_LABEL: &str = "Bulk update (5)";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Binding {
    SelectAll { master: NodeId },
    Selection,
    Navigate { control: NodeId },
    Conditional { container: NodeId },
}

impl Binding {
    pub(crate) fn kind_label(&self) -> &'static str {
        match self {
            Binding::SelectAll { .. } => "select-all",
            Binding::Selection => "selection",
            Binding::Navigate { .. } => "navigate",
            Binding::Conditional { .. } => "conditional",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MenuState {
    pub(crate) disabled: bool,
    pub(crate) label: &'static str,
}

pub(crate) fn any_selected<I>(states: I) -> bool
where
    I: IntoIterator<Item = bool>,
{
    states.into_iter().any(|checked| checked)
}

pub(crate) fn menu_state(any_selected: bool) -> MenuState {
    if any_selected {
        MenuState {
            disabled: false,
            label: markers::MENU_SELECTED_LABEL,
        }
    } else {
        MenuState {
            disabled: true,
            label: markers::MENU_DEFAULT_LABEL,
        }
    }
}

impl Page {
    pub(crate) fn bind_behaviors(&mut self) -> Result<()> {
        self.attach_widgets()?;

        for master in self.dom.query_selector_all(markers::BULK_SELECT_ALL)? {
            self.register(master, "change", Binding::SelectAll { master });
        }

        for checkbox in self.dom.query_selector_all(markers::BULK_UPDATE)? {
            self.register(checkbox, "change", Binding::Selection);
        }

        for control in self.dom.query_selector_all(markers::BULK_EDIT_MENU)? {
            self.register(control, "change", Binding::Navigate { control });
        }

        for container in self.dom.query_selector_all(markers::CONDITIONAL_FIELD)? {
            self.register(container, "change", Binding::Conditional { container });
        }

        for control in self.dom.query_selector_all(markers::STAGE_MENU)? {
            self.register(control, "change", Binding::Navigate { control });
        }

        Ok(())
    }

    fn attach_widgets(&mut self) -> Result<()> {
        for node in self.dom.query_selector_all(markers::AUTOCOMPLETE)? {
            let attachment = WidgetAttachment {
                element: self.node_label(node),
                config: WidgetConfig::default(),
            };
            self.trace_binding_line(format!("[widget] attach {}", attachment.element));
            self.widgets.push(attachment);
        }
        Ok(())
    }

    pub(crate) fn run_binding(&mut self, binding: Binding) -> Result<()> {
        match binding {
            Binding::SelectAll { master } => self.run_select_all(master),
            Binding::Selection => self.run_selection(),
            Binding::Navigate { control } => self.run_navigate(control),
            Binding::Conditional { container } => self.run_conditional(container),
        }
    }

    fn run_select_all(&mut self, master: NodeId) -> Result<()> {
        let forced = self.dom.checked(master)?;
        // Assigned directly; no change events fire on the rows, so the
        // action menus are not recomputed here.
        for item in self.dom.query_selector_all(markers::BULK_UPDATE)? {
            self.dom.set_checked(item, forced)?;
        }
        Ok(())
    }

    fn run_selection(&mut self) -> Result<()> {
        let mut states = Vec::new();
        for checkbox in self.dom.query_selector_all(markers::BULK_UPDATE)? {
            states.push(self.dom.checked(checkbox)?);
        }
        let state = menu_state(any_selected(states));

        for menu in self.dom.query_selector_all(markers::BULK_ACTION)? {
            self.dom.set_disabled(menu, state.disabled)?;
            if let Some(option) = self.dom.query_selector_from(&menu, "option")? {
                self.dom.set_text_content(option, state.label)?;
            }
        }
        Ok(())
    }

    fn run_navigate(&mut self, control: NodeId) -> Result<()> {
        let destination = self.dom.value(control)?;
        self.assign_location(&destination);
        Ok(())
    }

    fn run_conditional(&mut self, container: NodeId) -> Result<()> {
        let group = self
            .dom
            .attr(container, markers::CONDITIONAL_GROUP_ATTR)
            .unwrap_or_default();
        for panel in self.dom.query_selector_all(markers::CONDITIONAL_PANEL)? {
            if self.panel_group(panel)? == group {
                self.dom.class_add(panel, markers::HIDDEN_CLASS)?;
            }
        }

        let input = self.dom.query_selector_from(&container, "input")?;
        let show = match input {
            Some(input) => self.dom.checked(input)?,
            None => false,
        };
        if show {
            if let Some(panel) = self
                .dom
                .query_selector_from(&container, markers::CONDITIONAL_PANEL)?
            {
                self.dom.class_remove(panel, markers::HIDDEN_CLASS)?;
            }
        }
        Ok(())
    }

    // Containers and panels without a group attr share one anonymous group.
    fn panel_group(&self, panel: NodeId) -> Result<String> {
        let Some(container) = self.dom.closest(panel, markers::CONDITIONAL_FIELD)? else {
            return Ok(String::new());
        };
        Ok(self
            .dom
            .attr(container, markers::CONDITIONAL_GROUP_ATTR)
            .unwrap_or_default())
    }
}
