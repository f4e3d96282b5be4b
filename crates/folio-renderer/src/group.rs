//! Grouping of flat block sequences into render units.
//!
//! Consecutive list items of the same kind are merged into one list unit so
//! that they render inside a single `<ul>` or `<ol>`. Everything else passes
//! through as a standalone unit.

use folio_model::{Block, BlockKind};

/// Message of the unit produced for an empty sequence.
pub const EMPTY_MESSAGE: &str = "No content";

/// Kind of list container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Unordered list (`<ul>`).
    Bulleted,
    /// Ordered list (`<ol>`).
    Numbered,
}

/// Items the grouper can scan.
pub trait Groupable {
    /// List kind of the item, or `None` if it is not a list item.
    fn list_kind(&self) -> Option<ListKind>;
}

impl Groupable for Block {
    fn list_kind(&self) -> Option<ListKind> {
        match self.kind {
            BlockKind::BulletedListItem(_) => Some(ListKind::Bulleted),
            BlockKind::NumberedListItem(_) => Some(ListKind::Numbered),
            _ => None,
        }
    }
}

/// One unit of grouped output.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderUnit<'a, T> {
    /// A standalone item.
    Single(&'a T),
    /// A run of list items of the same kind.
    List {
        kind: ListKind,
        items: Vec<&'a T>,
    },
    /// Placeholder for an empty input sequence.
    Empty,
}

/// Units are opaque to the grouper: regrouping never merges them.
impl<T> Groupable for RenderUnit<'_, T> {
    fn list_kind(&self) -> Option<ListKind> {
        None
    }
}

/// Group `items` into render units in a single left-to-right pass.
///
/// An empty input yields a single [`RenderUnit::Empty`].
///
/// # Example
///
/// ```
/// use folio_model::{Block, BlockKind, TextBlock};
/// use folio_renderer::{ListKind, RenderUnit, group_blocks};
///
/// let item = |id: &str| Block::new(id, BlockKind::BulletedListItem(TextBlock::new(vec![])));
/// let blocks = vec![item("a"), item("b")];
///
/// let units = group_blocks(&blocks);
/// assert_eq!(units.len(), 1);
/// assert!(matches!(&units[0], RenderUnit::List { kind: ListKind::Bulleted, items } if items.len() == 2));
/// ```
pub fn group_blocks<T: Groupable>(items: &[T]) -> Vec<RenderUnit<'_, T>> {
    if items.is_empty() {
        return vec![RenderUnit::Empty];
    }

    let mut units = Vec::with_capacity(items.len());
    let mut current: Option<ListKind> = None;
    let mut pending: Vec<&T> = Vec::new();

    for item in items {
        match item.list_kind() {
            Some(kind) if current == Some(kind) => pending.push(item),
            Some(kind) => {
                flush(&mut units, current, &mut pending);
                current = Some(kind);
                pending.push(item);
            }
            None => {
                flush(&mut units, current, &mut pending);
                current = None;
                units.push(RenderUnit::Single(item));
            }
        }
    }
    flush(&mut units, current, &mut pending);

    units
}

/// Emit the pending run, if any, as one list unit.
fn flush<'a, T>(
    units: &mut Vec<RenderUnit<'a, T>>,
    kind: Option<ListKind>,
    pending: &mut Vec<&'a T>,
) {
    if let Some(kind) = kind
        && !pending.is_empty()
    {
        units.push(RenderUnit::List {
            kind,
            items: std::mem::take(pending),
        });
    }
}
