//! Lookup and iteration over the direct children of a section.
//!
//! None of these descend into nested subsections. Every lookup returns
//! `None` rather than an error when nothing matches.

use crate::config::tree::{Item, PairRef, SectionRef};

/// `None` and `Some("")` match any name.
fn name_matches(wanted: Option<&str>, actual: &str) -> bool {
    match wanted {
        None | Some("") => true,
        Some(name) => name == actual,
    }
}

impl<'a> SectionRef<'a> {
    fn children_from(&self, start: usize) -> impl Iterator<Item = Item<'a>> + 'a {
        let tree = self.tree;
        let children = &self.data().children;
        children
            .get(start..)
            .unwrap_or(&[])
            .iter()
            .map(move |&id| tree.item(id))
    }

    /// Position just past `item` among this section's children, if it is one.
    fn position_after(&self, item: &Item<'a>) -> Option<usize> {
        let tree = match item {
            Item::Pair(p) => p.tree,
            Item::Section(s) => s.tree,
        };
        if !std::ptr::eq(self.tree, tree) || item.parent_id() != Some(self.id) {
            return None;
        }
        Some(self.tree.node(item.id()).index + 1)
    }

    /// All direct children in file order.
    pub fn items(&self) -> impl Iterator<Item = Item<'a>> + 'a {
        self.children_from(0)
    }

    /// First pair named `name`, or the first pair of any name for `None`.
    pub fn find_pair(&self, name: Option<&str>) -> Option<PairRef<'a>> {
        self.find_next_pair(None, name)
    }

    /// Next pair named `name` after `after`; starts at the beginning when
    /// `after` is `None`.
    pub fn find_next_pair(&self, after: Option<PairRef<'a>>, name: Option<&str>) -> Option<PairRef<'a>> {
        let start = match after {
            None => 0,
            Some(pair) => self.position_after(&Item::Pair(pair))?,
        };
        self.children_from(start)
            .filter_map(|item| item.as_pair())
            .find(|pair| name_matches(name, pair.attribute()))
    }

    /// Value of the first pair named `attr`.
    pub fn value(&self, attr: &str) -> Option<&'a str> {
        self.find_pair(Some(attr)).map(|pair| pair.value())
    }

    /// Every pair named `name`, in file order.
    pub fn pairs_named(&self, name: &'a str) -> impl Iterator<Item = PairRef<'a>> + 'a {
        self.children_from(0)
            .filter_map(|item| item.as_pair())
            .filter(move |pair| pair.attribute() == name)
    }

    /// First subsection whose primary label is `name1`.
    pub fn find_subsection(&self, name1: &str) -> Option<SectionRef<'a>> {
        self.find_next_subsection(None, Some(name1))
    }

    /// Next subsection labelled `name1` after `after`; `None` matches any label.
    pub fn find_next_subsection(
        &self,
        after: Option<SectionRef<'a>>,
        name1: Option<&str>,
    ) -> Option<SectionRef<'a>> {
        let start = match after {
            None => 0,
            Some(section) => self.position_after(&Item::Section(section))?,
        };
        self.children_from(start)
            .filter_map(|item| item.as_section())
            .find(|section| name_matches(name1, section.name1()))
    }

    /// Every subsection labelled `name1`, in file order.
    pub fn subsections_named(&self, name1: &'a str) -> impl Iterator<Item = SectionRef<'a>> + 'a {
        self.children_from(0)
            .filter_map(|item| item.as_section())
            .filter(move |section| section.name1() == name1)
    }

    /// Sibling following `after`, or the first child when `after` is `None`.
    pub fn next_item(&self, after: Option<Item<'a>>) -> Option<Item<'a>> {
        let start = match after {
            None => 0,
            Some(item) => self.position_after(&item)?,
        };
        self.children_from(start).next()
    }
}
