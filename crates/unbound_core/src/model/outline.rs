//! Book structure outline.
//!
//! # Responsibility
//! - Hold the three-section book outline and issue stable chapter ids.
//! - Provide selection, rename, include toggle and reorder operations.
//!
//! # Invariants
//! - Item ids are `item_<n>` with `n` taken from a counter that never rewinds.
//! - Section headers are never selectable.
//! - Only Body items can be reordered.

use crate::model::chapter::ChapterId;
use std::error::Error;
use std::fmt::{Display, Formatter};

const FRONT_MATTER_ITEMS: &[&str] = &[
    "Copyright",
    "Dedication",
    "Epigraph",
    "Table of Contents",
    "Foreword",
    "Preface",
    "Acknowledgments",
];
const BODY_ITEMS: &[&str] = &[
    "Prologue",
    "Introduction",
    "Untitled Chapter",
    "Conclusion",
    "Epilogue",
    "Afterword",
];
const BACK_MATTER_ITEMS: &[&str] = &["Notes", "About the Author"];

/// Top-level outline section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    FrontMatter,
    Body,
    BackMatter,
}

impl SectionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::FrontMatter => "Front Matter",
            Self::Body => "Body",
            Self::BackMatter => "Back Matter",
        }
    }

    fn allows_reorder(self) -> bool {
        matches!(self, Self::Body)
    }

    fn included_by_default(self) -> bool {
        !matches!(self, Self::FrontMatter)
    }
}

/// Selectable outline entry backing one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    pub id: ChapterId,
    pub title: String,
    /// Whether the item is checked for inclusion in the manuscript.
    pub included: bool,
}

/// One outline section with its ordered items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineSection {
    pub kind: SectionKind,
    pub items: Vec<OutlineItem>,
}

/// Errors from outline mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineError {
    /// Title is blank after trim.
    BlankTitle,
    /// No item has this id.
    ItemNotFound(ChapterId),
    /// Item lives in a section that does not allow reordering.
    NotReorderable {
        id: ChapterId,
        section: SectionKind,
    },
}

impl Display for OutlineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "outline item title must not be blank"),
            Self::ItemNotFound(id) => write!(f, "outline item not found: {id}"),
            Self::NotReorderable { id, section } => write!(
                f,
                "outline item {id} cannot be moved inside {}",
                section.label()
            ),
        }
    }
}

impl Error for OutlineError {}

/// Front matter, body and back matter with their items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outline {
    sections: Vec<OutlineSection>,
    next_item: u32,
}

impl Default for Outline {
    fn default() -> Self {
        Self::default_book()
    }
}

impl Outline {
    /// Creates an outline with three empty sections.
    pub fn empty() -> Self {
        Self {
            sections: [
                SectionKind::FrontMatter,
                SectionKind::Body,
                SectionKind::BackMatter,
            ]
            .into_iter()
            .map(|kind| OutlineSection {
                kind,
                items: Vec::new(),
            })
            .collect(),
            next_item: 0,
        }
    }

    /// Creates the default book structure.
    pub fn default_book() -> Self {
        let mut outline = Self::empty();
        for (kind, titles) in [
            (SectionKind::FrontMatter, FRONT_MATTER_ITEMS),
            (SectionKind::Body, BODY_ITEMS),
            (SectionKind::BackMatter, BACK_MATTER_ITEMS),
        ] {
            for title in titles {
                outline.push_item(kind, (*title).to_string());
            }
        }
        outline
    }

    pub fn sections(&self) -> &[OutlineSection] {
        &self.sections
    }

    /// Resolves a selection. Unknown ids (including section headers) yield
    /// `None`.
    pub fn select(&self, id: &str) -> Option<&OutlineItem> {
        self.items().find(|item| item.id == id)
    }

    /// All items in display order.
    pub fn items(&self) -> impl Iterator<Item = &OutlineItem> {
        self.sections.iter().flat_map(|section| section.items.iter())
    }

    /// All item ids in display order.
    pub fn item_ids(&self) -> Vec<ChapterId> {
        self.items().map(|item| item.id.clone()).collect()
    }

    /// Appends a new item to a section and returns its id.
    pub fn add_item(
        &mut self,
        section: SectionKind,
        title: impl Into<String>,
    ) -> Result<ChapterId, OutlineError> {
        let title = normalize_title(title.into())?;
        Ok(self.push_item(section, title))
    }

    /// Renames an item.
    pub fn rename_item(&mut self, id: &str, title: impl Into<String>) -> Result<(), OutlineError> {
        let title = normalize_title(title.into())?;
        self.item_mut(id)?.title = title;
        Ok(())
    }

    /// Checks or unchecks an item for manuscript inclusion.
    pub fn set_included(&mut self, id: &str, included: bool) -> Result<(), OutlineError> {
        self.item_mut(id)?.included = included;
        Ok(())
    }

    /// Moves an item to `index` inside its own section. Indexes past the end
    /// move the item last.
    pub fn move_item(&mut self, id: &str, index: usize) -> Result<(), OutlineError> {
        let (section_index, item_index) = self
            .position(id)
            .ok_or_else(|| OutlineError::ItemNotFound(id.to_string()))?;
        let section = &mut self.sections[section_index];
        if !section.kind.allows_reorder() {
            return Err(OutlineError::NotReorderable {
                id: id.to_string(),
                section: section.kind,
            });
        }
        let item = section.items.remove(item_index);
        let target = index.min(section.items.len());
        section.items.insert(target, item);
        Ok(())
    }

    fn push_item(&mut self, kind: SectionKind, title: String) -> ChapterId {
        let id = format!("item_{}", self.next_item);
        self.next_item += 1;
        let section = self
            .sections
            .iter_mut()
            .find(|section| section.kind == kind);
        if let Some(section) = section {
            section.items.push(OutlineItem {
                id: id.clone(),
                title,
                included: kind.included_by_default(),
            });
        }
        id
    }

    fn position(&self, id: &str) -> Option<(usize, usize)> {
        self.sections
            .iter()
            .enumerate()
            .find_map(|(section_index, section)| {
                section
                    .items
                    .iter()
                    .position(|item| item.id == id)
                    .map(|item_index| (section_index, item_index))
            })
    }

    fn item_mut(&mut self, id: &str) -> Result<&mut OutlineItem, OutlineError> {
        self.sections
            .iter_mut()
            .flat_map(|section| section.items.iter_mut())
            .find(|item| item.id == id)
            .ok_or_else(|| OutlineError::ItemNotFound(id.to_string()))
    }
}

fn normalize_title(title: String) -> Result<String, OutlineError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(OutlineError::BlankTitle);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_book_numbers_items_across_sections() {
        let outline = Outline::default_book();
        let ids = outline.item_ids();
        assert_eq!(ids.len(), 15);
        assert_eq!(ids.first().map(String::as_str), Some("item_0"));
        assert_eq!(ids.last().map(String::as_str), Some("item_14"));

        let prologue = outline.select("item_7").expect("prologue exists");
        assert_eq!(prologue.title, "Prologue");
        assert!(prologue.included);
        assert!(!outline.select("item_0").expect("copyright exists").included);
    }

    #[test]
    fn section_labels_are_not_selectable() {
        let outline = Outline::default_book();
        assert!(outline.select("Body").is_none());
        assert!(outline.select("Front Matter").is_none());
    }

    #[test]
    fn only_body_items_can_move() {
        let mut outline = Outline::default_book();
        outline.move_item("item_9", 0).expect("body items move");
        let body = &outline.sections()[1];
        assert_eq!(body.items[0].title, "Untitled Chapter");

        let err = outline.move_item("item_0", 3).unwrap_err();
        assert!(matches!(err, OutlineError::NotReorderable { .. }));
    }

    #[test]
    fn added_items_never_reuse_ids() {
        let mut outline = Outline::default_book();
        let id = outline
            .add_item(SectionKind::Body, "  Chapter Two ")
            .expect("title is valid");
        assert_eq!(id, "item_15");
        assert_eq!(outline.select(&id).expect("added").title, "Chapter Two");
        assert_eq!(
            outline.add_item(SectionKind::Body, "   "),
            Err(OutlineError::BlankTitle)
        );
    }
}
