use fancy_regex::Regex;

use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub from: String,
    pub to: String,
}

#[derive(Debug)]
pub struct Page {
    pub(crate) dom: Dom,
    pub(crate) bindings: Vec<Binding>,
    pub(crate) listeners: ListenerStore,
    pub(crate) widgets: Vec<WidgetAttachment>,
    current_url: String,
    navigations: Vec<Navigation>,
    trace: bool,
    trace_events: bool,
    trace_bindings: bool,
    trace_logs: Vec<String>,
    trace_log_limit: usize,
    trace_to_stderr: bool,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_url("about:blank", html)
    }

    pub fn from_html_with_url(url: &str, html: &str) -> Result<Self> {
        let dom = parse_html(html)?;
        let mut page = Self {
            dom,
            bindings: Vec::new(),
            listeners: ListenerStore::default(),
            widgets: Vec::new(),
            current_url: url.to_string(),
            navigations: Vec::new(),
            trace: false,
            trace_events: true,
            trace_bindings: true,
            trace_logs: Vec::new(),
            trace_log_limit: 10_000,
            trace_to_stderr: true,
        };
        page.bind_behaviors()?;
        Ok(page)
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs)
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_events = enabled;
    }

    pub fn set_trace_bindings(&mut self, enabled: bool) {
        self.trace_bindings = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Runtime(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_log_limit = max_entries;
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
        Ok(())
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        stacker::grow(32 * 1024 * 1024, || {
            self.dispatch_event(target, "click")?;

            if is_checkbox_input(&self.dom, target) {
                let current = self.dom.checked(target)?;
                self.dom.set_checked(target, !current)?;
                self.dispatch_event(target, "input")?;
                self.dispatch_event(target, "change")?;
            }

            if is_radio_input(&self.dom, target) {
                let current = self.dom.checked(target)?;
                if !current {
                    self.dom.uncheck_other_radios_in_group(target)?;
                    self.dom.set_checked(target, true)?;
                    self.dispatch_event(target, "input")?;
                    self.dispatch_event(target, "change")?;
                }
            }

            Ok(())
        })
    }

    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        let tag = self
            .dom
            .tag_name(target)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if tag != "input" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=checkbox|radio]".into(),
                actual: tag,
            });
        }

        let kind = self
            .dom
            .attr(target, "type")
            .unwrap_or_else(|| "text".into())
            .to_ascii_lowercase();
        if kind != "checkbox" && kind != "radio" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=checkbox|radio]".into(),
                actual: format!("input[type={kind}]"),
            });
        }

        stacker::grow(32 * 1024 * 1024, || {
            let current = self.dom.checked(target)?;
            if current != checked {
                if kind == "radio" && checked {
                    self.dom.uncheck_other_radios_in_group(target)?;
                }
                self.dom.set_checked(target, checked)?;
                self.dispatch_event(target, "input")?;
                self.dispatch_event(target, "change")?;
            }
            Ok(())
        })
    }

    pub fn select_option(&mut self, selector: &str, value: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        let tag = self
            .dom
            .tag_name(target)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if tag != "select" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "select".into(),
                actual: tag,
            });
        }

        let mut options = Vec::new();
        self.dom.collect_select_options(target, &mut options);
        let mut known = false;
        for option in options {
            if self.dom.option_effective_value(option)? == value {
                known = true;
                break;
            }
        }
        if !known {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: format!("a select with an option valued {value:?}"),
                actual: tag,
            });
        }

        stacker::grow(32 * 1024 * 1024, || {
            let current = self.dom.value(target)?;
            if current != value {
                self.dom.set_select_value(target, value)?;
                self.dispatch_event(target, "input")?;
                self.dispatch_event(target, "change")?;
            }
            Ok(())
        })
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        let tag = self
            .dom
            .tag_name(target)
            .ok_or_else(|| Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: "non-element".into(),
            })?
            .to_ascii_lowercase();

        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }

        stacker::grow(32 * 1024 * 1024, || {
            self.dom.set_value(target, text)?;
            self.dispatch_event(target, "input")?;
            Ok(())
        })
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        stacker::grow(32 * 1024 * 1024, || self.dispatch_event(target, event))
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.text_content(target))
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.value(target)
    }

    pub fn checked(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        self.dom.checked(target)
    }

    pub fn disabled(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.dom.disabled(target))
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.dom.class_contains(target, class_name))
    }

    pub fn location(&self) -> &str {
        &self.current_url
    }

    pub fn navigations(&self) -> &[Navigation] {
        &self.navigations
    }

    pub fn widget_attachments(&self) -> &[WidgetAttachment] {
        &self.widgets
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_text_matches(&self, selector: &str, pattern: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        let regex = Regex::new(pattern).map_err(|err| Error::Pattern(err.to_string()))?;
        let matched = regex
            .is_match(&actual)
            .map_err(|err| Error::Pattern(err.to_string()))?;
        if !matched {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("text matching /{pattern}/"),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_checked(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.checked(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_disabled(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.disabled(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_has_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.class_contains(target, class_name);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("class {class_name:?} present={expected}"),
                actual: format!("present={actual}"),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    fn dispatch_event(&mut self, target: NodeId, event_type: &str) -> Result<()> {
        let mut event = EventState::new(event_type, target);
        let target_label = self.node_label(event.target);
        self.trace_event_line(format!("[event] {event_type} target={target_label}"));

        let mut ran = 0usize;
        for node in event_path(&self.dom, target) {
            event.current_target = node;
            for id in self.listeners.get(node, &event.event_type) {
                let binding = self.bindings[id.0].clone();
                if self.trace {
                    let current_label = self.node_label(event.current_target);
                    self.trace_binding_line(format!(
                        "[binding] {} target={target_label} current={current_label}",
                        binding.kind_label()
                    ));
                }
                self.run_binding(binding)?;
                ran += 1;
            }
        }

        self.trace_event_line(format!(
            "[event] done {event_type} target={target_label} ran={ran}"
        ));
        Ok(())
    }

    pub(crate) fn register(&mut self, node: NodeId, event_type: &str, binding: Binding) {
        let id = BindingId(self.bindings.len());
        self.bindings.push(binding);
        self.listeners.add(node, event_type, id);
    }

    pub(crate) fn assign_location(&mut self, to: &str) {
        let from = self.current_url.clone();
        self.trace_binding_line(format!("[location] assign from={from} to={to}"));
        self.navigations.push(Navigation {
            from,
            to: to.to_string(),
        });
        self.current_url = to.to_string();
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }

    pub(crate) fn node_label(&self, node: NodeId) -> String {
        if let Some(id) = self.dom.attr(node, "id") {
            if !id.is_empty() {
                return format!("#{id}");
            }
        }
        self.dom
            .tag_name(node)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("node-{}", node.0))
    }

    pub(crate) fn trace_event_line(&mut self, line: String) {
        if self.trace && self.trace_events {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_binding_line(&mut self, line: String) {
        if self.trace && self.trace_bindings {
            self.trace_line(line);
        }
    }

    fn trace_line(&mut self, line: String) {
        if self.trace {
            if self.trace_to_stderr {
                eprintln!("{line}");
            }
            if self.trace_logs.len() >= self.trace_log_limit {
                self.trace_logs.remove(0);
            }
            self.trace_logs.push(line);
        }
    }
}
