//! Builds the storefront's category hierarchy from the flat `/categories` list.
//!
//! The API returns every category once, each pointing at its parent by id.
//! The tree keeps only categories reachable from a top-level category
//! (`parent == 0`) through retained parents:
//!
//! - the `"uncategorized"` bucket is removed before anything else, so neither
//!   it nor anything beneath it appears;
//! - a category whose parent id is not among the retained categories is
//!   dropped together with its subtree;
//! - siblings are ordered by name at every depth, ignoring case and accents.
//!
//! Cycles in the input are unreachable from a top-level node and fall out the
//! same way orphans do, so construction always terminates.

use std::collections::HashMap;

use crate::categories::{Category, HierarchicalCategory};

/// Builds a sorted forest of [`HierarchicalCategory`] nodes from a flat list.
///
/// Malformed entries are dropped, never rejected. When two entries share an
/// id, the later one wins.
#[must_use]
pub fn build_category_tree(categories: &[Category]) -> Vec<HierarchicalCategory> {
    let retained: HashMap<i64, &Category> = categories
        .iter()
        .filter(|c| !c.is_uncategorized())
        .map(|c| (c.id, c))
        .collect();

    let mut roots: Vec<&Category> = Vec::new();
    let mut children_of: HashMap<i64, Vec<&Category>> = HashMap::new();
    let mut orphans = 0usize;

    for category in retained.values() {
        if category.is_top_level() {
            roots.push(category);
        } else if retained.contains_key(&category.parent) {
            children_of.entry(category.parent).or_default().push(category);
        } else {
            orphans += 1;
        }
    }

    if orphans > 0 {
        tracing::debug!(
            orphans,
            total = categories.len(),
            "dropped categories whose parent is not in the tree"
        );
    }

    let mut tree: Vec<HierarchicalCategory> = roots
        .into_iter()
        .map(|root| attach_children(root, &children_of))
        .collect();
    sort_siblings(&mut tree);
    tree
}

fn attach_children(
    category: &Category,
    children_of: &HashMap<i64, Vec<&Category>>,
) -> HierarchicalCategory {
    let mut node = HierarchicalCategory::new(category.clone());
    if let Some(children) = children_of.get(&category.id) {
        node.children = children
            .iter()
            .map(|child| attach_children(child, children_of))
            .collect();
        sort_siblings(&mut node.children);
    }
    node
}

fn sort_siblings(nodes: &mut [HierarchicalCategory]) {
    nodes.sort_by_cached_key(|n| {
        (
            collation_key(&n.category.name),
            n.category.name.clone(),
            n.category.id,
        )
    });
}

/// Lowercased, accent-folded form of a name used for ordering.
///
/// Combining marks (U+0300..=U+036F) are dropped, so decomposed text folds
/// the same as precomposed text. Precomposed Latin-1 and Latin Extended-A
/// letters map to their base letters, ligatures expand (`æ` to `ae`). Other
/// scripts compare by lowercased code point.
fn collation_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        if is_combining_mark(c) {
            continue;
        }
        match fold_accent(c) {
            Folded::One(base) => key.push(base),
            Folded::Two(a, b) => {
                key.push(a);
                key.push(b);
            }
        }
    }
    key
}

enum Folded {
    One(char),
    Two(char, char),
}

fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}')
}

fn fold_accent(c: char) -> Folded {
    let base = match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' | 'ð' => 'd',
        'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ĥ' | 'ħ' => 'h',
        'í' | 'ì' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'ĵ' => 'j',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' | 'ŧ' => 't',
        'ú' | 'ù' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ŵ' => 'w',
        'ý' | 'ÿ' | 'ŷ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        'æ' => return Folded::Two('a', 'e'),
        'œ' => return Folded::Two('o', 'e'),
        'ß' => return Folded::Two('s', 's'),
        'þ' => return Folded::Two('t', 'h'),
        _ => c,
    };
    Folded::One(base)
}

/// Finds the node with the given slug anywhere in the tree (depth-first).
#[must_use]
pub fn find_by_slug<'a>(
    tree: &'a [HierarchicalCategory],
    slug: &str,
) -> Option<&'a HierarchicalCategory> {
    tree.iter().find_map(|node| {
        if node.category.slug == slug {
            Some(node)
        } else {
            find_by_slug(&node.children, slug)
        }
    })
}

/// Visits every node in display order, passing its depth (`0` for top level).
pub fn walk<F>(tree: &[HierarchicalCategory], visit: &mut F)
where
    F: FnMut(usize, &HierarchicalCategory),
{
    walk_at(tree, 0, visit);
}

fn walk_at<F>(tree: &[HierarchicalCategory], depth: usize, visit: &mut F)
where
    F: FnMut(usize, &HierarchicalCategory),
{
    for node in tree {
        visit(depth, node);
        walk_at(&node.children, depth + 1, visit);
    }
}
