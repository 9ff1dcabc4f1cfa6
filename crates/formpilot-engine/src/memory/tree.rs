use super::selector::{ComplexSelector, CompoundSelector, SelectorList};
use formpilot_common::error::DomError;
use formpilot_common::protocol::ElementId;
use std::collections::BTreeMap;

/// Declarative description of an element subtree to insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSpec {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub value: String,
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Adds a class, keeping any already present.
    pub fn class(mut self, class: &str) -> Self {
        let classes = self.attributes.entry("class".to_string()).or_default();
        if !classes.is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    value: String,
    parent: Option<usize>,
    children: Vec<usize>,
    attached: bool,
}

/// Arena-backed element tree rooted at `<body>`.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    focused: Option<usize>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                tag: "body".to_string(),
                attributes: BTreeMap::new(),
                text: String::new(),
                value: String::new(),
                parent: None,
                children: Vec::new(),
                attached: true,
            }],
            focused: None,
        }
    }

    pub fn body(&self) -> ElementId {
        ElementId(0)
    }

    fn index(&self, element: ElementId) -> Result<usize, DomError> {
        let index = usize::try_from(element.0).map_err(|_| DomError::StaleElement { id: element })?;
        match self.nodes.get(index) {
            Some(node) if node.attached => Ok(index),
            _ => Err(DomError::StaleElement { id: element }),
        }
    }

    fn node(&self, element: ElementId) -> Result<&Node, DomError> {
        let index = self.index(element)?;
        Ok(&self.nodes[index])
    }

    fn node_mut(&mut self, element: ElementId) -> Result<&mut Node, DomError> {
        let index = self.index(element)?;
        Ok(&mut self.nodes[index])
    }

    pub fn append(&mut self, parent: ElementId, spec: ElementSpec) -> Result<ElementId, DomError> {
        let parent = self.index(parent)?;
        Ok(ElementId(self.insert(parent, spec) as u64))
    }

    /// The body is never detached, so appending to it cannot fail.
    pub fn append_to_body(&mut self, spec: ElementSpec) -> ElementId {
        ElementId(self.insert(0, spec) as u64)
    }

    fn insert(&mut self, parent: usize, spec: ElementSpec) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            tag: spec.tag,
            attributes: spec.attributes,
            text: spec.text,
            value: spec.value,
            parent: Some(parent),
            children: Vec::new(),
            attached: true,
        });
        self.nodes[parent].children.push(index);
        for child in spec.children {
            self.insert(index, child);
        }
        index
    }

    /// Detaches the element and its subtree. The body cannot be removed.
    pub fn remove(&mut self, element: ElementId) -> Result<(), DomError> {
        let index = self.index(element)?;
        let Some(parent) = self.nodes[index].parent else {
            return Err(DomError::Other("cannot remove the document body".into()));
        };
        self.nodes[parent].children.retain(|&c| c != index);

        let mut pending = vec![index];
        while let Some(current) = pending.pop() {
            self.nodes[current].attached = false;
            if self.focused == Some(current) {
                self.focused = None;
            }
            pending.extend(self.nodes[current].children.iter().copied());
        }
        Ok(())
    }

    pub fn tag(&self, element: ElementId) -> Result<&str, DomError> {
        Ok(&self.node(element)?.tag)
    }

    pub fn attribute(&self, element: ElementId, name: &str) -> Result<Option<&str>, DomError> {
        Ok(self.node(element)?.attributes.get(name).map(String::as_str))
    }

    pub fn set_attribute(
        &mut self,
        element: ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        self.node_mut(element)?
            .attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
        Ok(())
    }

    pub fn set_text(&mut self, element: ElementId, text: &str) -> Result<(), DomError> {
        self.node_mut(element)?.text = text.to_string();
        Ok(())
    }

    pub fn value(&self, element: ElementId) -> Result<&str, DomError> {
        Ok(&self.node(element)?.value)
    }

    pub fn set_value(&mut self, element: ElementId, value: &str) -> Result<(), DomError> {
        self.node_mut(element)?.value = value.to_string();
        Ok(())
    }

    pub fn focus(&mut self, element: ElementId) -> Result<(), DomError> {
        let index = self.index(element)?;
        self.focused = Some(index);
        Ok(())
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused.map(|i| ElementId(i as u64))
    }

    /// Text of the element followed by its descendants' text, in document order.
    pub fn inner_text(&self, element: ElementId) -> Result<String, DomError> {
        let index = self.index(element)?;
        let mut text = String::new();
        self.collect_text(index, &mut text);
        Ok(text)
    }

    fn collect_text(&self, index: usize, out: &mut String) {
        let node = &self.nodes[index];
        out.push_str(&node.text);
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    /// Attached elements in document (pre-)order, body first.
    fn document_order(&self) -> Vec<usize> {
        let mut order = Vec::new();
        let mut stack = vec![0usize];
        while let Some(index) = stack.pop() {
            order.push(index);
            stack.extend(self.nodes[index].children.iter().rev().copied());
        }
        order
    }

    pub fn query_all(&self, selector: &SelectorList) -> Vec<ElementId> {
        self.document_order()
            .into_iter()
            .filter(|&index| {
                selector
                    .selectors
                    .iter()
                    .any(|complex| self.matches_complex(index, complex))
            })
            .map(|index| ElementId(index as u64))
            .collect()
    }

    pub fn query(&self, selector: &SelectorList) -> Option<ElementId> {
        self.query_all(selector).into_iter().next()
    }

    fn matches_complex(&self, index: usize, complex: &ComplexSelector) -> bool {
        let Some((subject, ancestors)) = complex.compounds.split_last() else {
            return false;
        };
        if !self.matches_compound(index, subject) {
            return false;
        }

        // Descendant combinators only, so greedily matching the nearest
        // ancestor for each compound is exact.
        let mut cursor = self.nodes[index].parent;
        for compound in ancestors.iter().rev() {
            loop {
                match cursor {
                    None => return false,
                    Some(ancestor) => {
                        cursor = self.nodes[ancestor].parent;
                        if self.matches_compound(ancestor, compound) {
                            break;
                        }
                    }
                }
            }
        }
        true
    }

    fn matches_compound(&self, index: usize, compound: &CompoundSelector) -> bool {
        let node = &self.nodes[index];

        if let Some(tag) = &compound.tag
            && !node.tag.eq_ignore_ascii_case(tag)
        {
            return false;
        }

        if let Some(id) = &compound.id
            && node.attributes.get("id") != Some(id)
        {
            return false;
        }

        if !compound.classes.is_empty() {
            let classes = node.attributes.get("class").map(String::as_str).unwrap_or("");
            let present: Vec<&str> = classes.split_whitespace().collect();
            if !compound.classes.iter().all(|c| present.contains(&c.as_str())) {
                return false;
            }
        }

        compound.attributes.iter().all(|attribute| {
            match (node.attributes.get(&attribute.name), &attribute.matcher) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some((op, expected))) => op.matches(actual, expected),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::selector::parse_selector;

    fn sample() -> DomTree {
        let mut tree = DomTree::new();
        let body = tree.body();
        tree.append(
            body,
            ElementSpec::new("form")
                .id("job_application_form")
                .child(ElementSpec::new("input").id("first_name"))
                .child(
                    ElementSpec::new("div")
                        .class("field")
                        .child(ElementSpec::new("input").attr("name", "question_linkedin")),
                ),
        )
        .unwrap();
        tree.append(
            body,
            ElementSpec::new("div")
                .class("select__menu")
                .child(ElementSpec::new("div").class("select__option").text("Istanbul, Turkey"))
                .child(ElementSpec::new("div").class("select__option").text("Istanbul, New York")),
        )
        .unwrap();
        tree
    }

    fn query_all(tree: &DomTree, selector: &str) -> Vec<ElementId> {
        tree.query_all(&parse_selector(selector).unwrap())
    }

    #[test]
    fn test_query_by_id_tag_and_attribute() {
        let tree = sample();
        assert_eq!(query_all(&tree, "#first_name").len(), 1);
        assert_eq!(query_all(&tree, "form[id*=\"application\"]").len(), 1);
        assert_eq!(query_all(&tree, "input[name*=\"linkedin\"]").len(), 1);
        assert_eq!(query_all(&tree, "input").len(), 2);
        assert!(query_all(&tree, "textarea").is_empty());
    }

    #[test]
    fn test_query_preserves_document_order() {
        let tree = sample();
        let options = query_all(&tree, ".select__option");
        assert_eq!(options.len(), 2);
        assert_eq!(tree.inner_text(options[0]).unwrap(), "Istanbul, Turkey");
        assert_eq!(tree.inner_text(options[1]).unwrap(), "Istanbul, New York");
    }

    #[test]
    fn test_descendant_combinator() {
        let tree = sample();
        assert_eq!(query_all(&tree, "form .field input").len(), 1);
        assert_eq!(query_all(&tree, "form input").len(), 2);
        assert!(query_all(&tree, ".select__menu input").is_empty());
    }

    #[test]
    fn test_selector_list_matches_each_element_once() {
        let tree = sample();
        assert_eq!(query_all(&tree, "input, #first_name").len(), 2);
    }

    #[test]
    fn test_inner_text_includes_descendants() {
        let tree = sample();
        let menu = query_all(&tree, ".select__menu")[0];
        assert_eq!(
            tree.inner_text(menu).unwrap(),
            "Istanbul, TurkeyIstanbul, New York"
        );
    }

    #[test]
    fn test_removed_subtree_is_stale() {
        let mut tree = sample();
        let menu = query_all(&tree, ".select__menu")[0];
        let option = query_all(&tree, ".select__option")[0];
        tree.focus(option).unwrap();
        tree.remove(menu).unwrap();

        assert!(query_all(&tree, ".select__option").is_empty());
        assert!(matches!(
            tree.inner_text(option),
            Err(DomError::StaleElement { .. })
        ));
        assert_eq!(tree.focused(), None);
        assert!(tree.remove(tree.body()).is_err());
    }
}
