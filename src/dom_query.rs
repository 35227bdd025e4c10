use std::collections::HashSet;

use super::*;

impl Dom {
    pub(crate) fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let all = self.query_selector_all(selector)?;
        Ok(all.into_iter().next())
    }

    pub(crate) fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;

        if groups.len() == 1 && groups[0].len() == 1 {
            if let Some(id) = groups[0][0].step.id_only() {
                return Ok(self.by_id(id).into_iter().collect());
            }
        }

        let mut ids = Vec::new();
        self.collect_elements_dfs(self.root, &mut ids);

        let mut seen = HashSet::new();
        let mut matched = Vec::new();
        for candidate in ids {
            if groups
                .iter()
                .any(|steps| self.matches_selector_chain(candidate, steps))
                && seen.insert(candidate)
            {
                matched.push(candidate);
            }
        }
        Ok(matched)
    }

    pub(crate) fn query_selector_from(
        &self,
        root: &NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>> {
        let all = self.query_selector_all_from(root, selector)?;
        Ok(all.into_iter().next())
    }

    pub(crate) fn query_selector_all_from(
        &self,
        root: &NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;

        let mut ids = Vec::new();
        self.collect_elements_dfs(*root, &mut ids);

        let mut seen = HashSet::new();
        let mut matched = Vec::new();
        for candidate in ids {
            if groups
                .iter()
                .any(|steps| self.matches_selector_chain(candidate, steps))
                && seen.insert(candidate)
            {
                matched.push(candidate);
            }
        }
        Ok(matched)
    }

    pub(crate) fn closest(&self, node_id: NodeId, selector: &str) -> Result<Option<NodeId>> {
        if self.element(node_id).is_none() {
            return Ok(None);
        }

        let groups = parse_selector_groups(selector)?;
        let mut cursor = Some(node_id);
        while let Some(current) = cursor {
            if groups
                .iter()
                .any(|steps| self.matches_selector_chain(current, steps))
            {
                return Ok(Some(current));
            }
            cursor = self.parent(current);
        }
        Ok(None)
    }

    pub(crate) fn matches_selector_chain(&self, node_id: NodeId, steps: &[SelectorPart]) -> bool {
        if steps.is_empty() {
            return false;
        }
        if !self.matches_step(node_id, &steps[steps.len() - 1].step) {
            return false;
        }

        let mut current = node_id;
        for idx in (1..steps.len()).rev() {
            let prev_step = &steps[idx - 1].step;
            let combinator = steps[idx]
                .combinator
                .unwrap_or(SelectorCombinator::Descendant);

            let matched = match combinator {
                SelectorCombinator::Child => {
                    let Some(parent) = self.parent(current) else {
                        return false;
                    };
                    if self.matches_step(parent, prev_step) {
                        Some(parent)
                    } else {
                        None
                    }
                }
                SelectorCombinator::Descendant => {
                    let mut cursor = self.parent(current);
                    let mut found = None;
                    while let Some(parent) = cursor {
                        if self.matches_step(parent, prev_step) {
                            found = Some(parent);
                            break;
                        }
                        cursor = self.parent(parent);
                    }
                    found
                }
                SelectorCombinator::AdjacentSibling => self
                    .previous_element_sibling(current)
                    .filter(|sibling| self.matches_step(*sibling, prev_step)),
                SelectorCombinator::GeneralSibling => {
                    let mut cursor = self.previous_element_sibling(current);
                    let mut found = None;
                    while let Some(sibling) = cursor {
                        if self.matches_step(sibling, prev_step) {
                            found = Some(sibling);
                            break;
                        }
                        cursor = self.previous_element_sibling(sibling);
                    }
                    found
                }
            };

            let Some(matched) = matched else {
                return false;
            };
            current = matched;
        }

        true
    }

    pub(crate) fn matches_step(&self, node_id: NodeId, step: &SelectorStep) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };

        if !step.universal {
            if let Some(tag) = &step.tag {
                if !element.tag_name.eq_ignore_ascii_case(tag) {
                    return false;
                }
            }
        } else if step.tag.is_some() {
            return false;
        }

        if let Some(id) = &step.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }

        if step
            .classes
            .iter()
            .any(|class_name| !has_class(element, class_name))
        {
            return false;
        }

        for cond in &step.attrs {
            let matched = match cond {
                SelectorAttrCondition::Exists { key } => element.attrs.contains_key(key),
                SelectorAttrCondition::Eq { key, value } => element.attrs.get(key) == Some(value),
                SelectorAttrCondition::StartsWith { key, value } => {
                    !value.is_empty()
                        && element
                            .attrs
                            .get(key)
                            .is_some_and(|attr| attr.starts_with(value.as_str()))
                }
                SelectorAttrCondition::EndsWith { key, value } => {
                    !value.is_empty()
                        && element
                            .attrs
                            .get(key)
                            .is_some_and(|attr| attr.ends_with(value.as_str()))
                }
                SelectorAttrCondition::Contains { key, value } => {
                    !value.is_empty()
                        && element
                            .attrs
                            .get(key)
                            .is_some_and(|attr| attr.contains(value.as_str()))
                }
            };
            if !matched {
                return false;
            }
        }

        for pseudo in &step.pseudo_classes {
            let matched = match pseudo {
                SelectorPseudoClass::FirstChild => self.is_first_element_child(node_id),
                SelectorPseudoClass::LastChild => self.is_last_element_child(node_id),
                SelectorPseudoClass::Checked => {
                    self.element(node_id).is_some_and(|node| node.checked)
                }
                SelectorPseudoClass::Disabled => {
                    self.element(node_id).is_some_and(|node| node.disabled)
                }
                SelectorPseudoClass::Enabled => {
                    self.element(node_id).is_some_and(|node| !node.disabled)
                }
                SelectorPseudoClass::Not(inners) => !inners
                    .iter()
                    .any(|inner| self.matches_selector_chain(node_id, inner)),
            };
            if !matched {
                return false;
            }
        }

        true
    }

    pub(crate) fn is_first_element_child(&self, node_id: NodeId) -> bool {
        self.previous_element_sibling(node_id).is_none()
    }

    pub(crate) fn is_last_element_child(&self, node_id: NodeId) -> bool {
        self.next_element_sibling(node_id).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_dom() -> Result<Dom> {
        parse_html(
            r#"
            <form>
              <input type="checkbox" data-bulk-update id="row-1">
              <input type="checkbox" data-bulk-update id="row-2" checked>
              <select id="sort-bulk-edit" data-bulk-action disabled>
                <option value="">Bulk update</option>
                <option value="/bulk/stage">Change stage</option>
              </select>
              <div class="panel d-none"><span class="inner">x</span></div>
            </form>
            "#,
        )
    }

    #[test]
    fn attr_existence_and_value_selectors_match() -> Result<()> {
        let dom = listing_dom()?;
        assert_eq!(dom.query_selector_all("[data-bulk-update]")?.len(), 2);
        assert_eq!(
            dom.query_selector_all("input[type=checkbox][data-bulk-update]")?
                .len(),
            2
        );
        assert_eq!(dom.query_selector_all("[data-bulk-action]")?.len(), 1);
        Ok(())
    }

    #[test]
    fn id_fast_path_and_scoped_queries() -> Result<()> {
        let dom = listing_dom()?;
        let menu = dom.query_selector("#sort-bulk-edit")?;
        assert!(menu.is_some());
        let menu = menu.ok_or_else(|| Error::Runtime("menu missing".to_string()))?;
        let options = dom.query_selector_all_from(&menu, "option")?;
        assert_eq!(options.len(), 2);
        let first = dom.query_selector_from(&menu, "option")?;
        assert_eq!(first, options.first().copied());
        Ok(())
    }

    #[test]
    fn pseudo_classes_track_element_state() -> Result<()> {
        let dom = listing_dom()?;
        assert_eq!(dom.query_selector_all("input:checked")?.len(), 1);
        assert_eq!(dom.query_selector_all("select:disabled")?.len(), 1);
        assert_eq!(dom.query_selector_all("input:enabled")?.len(), 2);
        assert_eq!(dom.query_selector_all("input:not(:checked)")?.len(), 1);
        Ok(())
    }

    #[test]
    fn combinators_walk_structure() -> Result<()> {
        let dom = listing_dom()?;
        assert_eq!(dom.query_selector_all("form > select option")?.len(), 2);
        assert_eq!(dom.query_selector_all("input + input")?.len(), 1);
        assert_eq!(dom.query_selector_all("input ~ select")?.len(), 1);
        assert_eq!(dom.query_selector_all("option:first-child")?.len(), 1);
        assert_eq!(dom.query_selector_all("option:last-child")?.len(), 1);
        Ok(())
    }

    #[test]
    fn closest_walks_ancestors_including_self() -> Result<()> {
        let dom = listing_dom()?;
        let inner = dom
            .query_selector(".inner")?
            .ok_or_else(|| Error::Runtime("inner missing".to_string()))?;
        let panel = dom.closest(inner, ".panel")?;
        assert!(panel.is_some());
        assert_eq!(dom.closest(inner, ".inner")?, Some(inner));
        assert_eq!(dom.closest(inner, "#missing")?, None);
        Ok(())
    }

    #[test]
    fn comma_groups_dedupe_matches() -> Result<()> {
        let dom = listing_dom()?;
        let matched = dom.query_selector_all("input, [data-bulk-update]")?;
        assert_eq!(matched.len(), 2);
        Ok(())
    }
}
