//! Display names for declarations.
//!
//! Every candidate title of a node is turned into a PascalCase name, then one
//! name is chosen per node:
//!
//! 1. a title with a name override, or a title that is already a proper type
//!    name, gives an explicit name; the first explicit name wins
//! 2. otherwise the shortest generated name wins, ties going to the title that
//!    was seen first
//!
//! Generated names come from the subject span of the title: the tokens after
//! the rightmost `id`/`element` marker, or between the last two markers when
//! the title ends with one.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::error::{NamingConflict, Result, TypegenError};
use crate::graph::{TypeGraph, TypeId};
use crate::namespace::NamespaceTree;
use crate::overrides::Overrides;
use crate::words::{self, ELEMENT_MARKER};

/// A name derived from one title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCandidate {
    /// PascalCase name.
    pub name: String,
    /// From an override or an already proper title.
    pub explicit: bool,
}

/// Picks final names using the name override table.
#[derive(Debug, Clone, Copy)]
pub struct TypeNamer<'a> {
    overrides: &'a Overrides,
}

impl<'a> TypeNamer<'a> {
    /// Namer reading `overrides` for explicit names.
    pub fn new(overrides: &'a Overrides) -> Self {
        Self { overrides }
    }

    /// Candidate name for one title inside a namespace given by its segments.
    pub fn name_title(&self, title: &str, segments: &[&str]) -> NameCandidate {
        if let Some(name) = self.overrides.type_name(title) {
            return NameCandidate {
                name: name.to_string(),
                explicit: true,
            };
        }
        if words::is_proper_name(title) {
            return NameCandidate {
                name: title.to_string(),
                explicit: true,
            };
        }
        NameCandidate {
            name: generate(title, segments),
            explicit: false,
        }
    }

    /// Name every live declaration in `graph` and return how many were named.
    pub fn name_all(&self, graph: &mut TypeGraph, tree: &mut NamespaceTree) -> Result<usize> {
        let ids: Vec<TypeId> = graph.declarations().map(|node| node.id).collect();
        for id in &ids {
            let node = graph.node(*id);
            if node.titles.is_empty() {
                return Err(TypegenError::UnresolvedName(*id));
            }
            let namespace = tree.namespace_of(*id).unwrap_or_else(|| tree.root());
            let segments = tree.segments(namespace);
            let candidates: Vec<NameCandidate> = node
                .titles
                .iter()
                .map(|title| self.name_title(title, &segments))
                .collect();
            let label = node.label();

            let (chosen, conflict) = choose(&label, &candidates);
            if let Some(conflict) = conflict {
                warn!(%conflict, "Conflicting explicit names.");
                tree.push_log(namespace, conflict.to_string());
            }
            if let Err(conflict) = graph.rename_type(*id, &chosen.name, chosen.explicit) {
                warn!(%conflict, "Explicit rename rejected.");
                tree.push_log(namespace, conflict.to_string());
            }
        }
        flag_duplicates(graph, tree);
        debug!(named = ids.len(), "Types named.");
        Ok(ids.len())
    }
}

/// Pick one candidate: first explicit, else shortest (first on ties).
fn choose(subject: &str, candidates: &[NameCandidate]) -> (NameCandidate, Option<NamingConflict>) {
    let mut explicit: Vec<&NameCandidate> = Vec::new();
    for candidate in candidates.iter().filter(|c| c.explicit) {
        if !explicit.iter().any(|seen| seen.name == candidate.name) {
            explicit.push(candidate);
        }
    }
    if let Some(first) = explicit.first() {
        let conflict = (explicit.len() > 1).then(|| NamingConflict {
            subject: subject.to_string(),
            claims: explicit.iter().map(|c| c.name.clone()).collect(),
            resolution: first.name.clone(),
        });
        return ((*first).clone(), conflict);
    }
    let shortest = candidates
        .iter()
        .reduce(|best, candidate| {
            if candidate.name.len() < best.name.len() {
                candidate
            } else {
                best
            }
        })
        .cloned()
        .unwrap_or_else(|| NameCandidate {
            name: words::to_pascal_case(&words::tokenize(subject)),
            explicit: false,
        });
    (shortest, None)
}

/// Generated PascalCase name for a lower snake case title.
fn generate(title: &str, segments: &[&str]) -> String {
    fn droppable(token: &str) -> bool {
        words::is_http_method(token) || words::is_status_token(token) || words::is_marker(token)
    }

    let tokens = words::tokenize(title);

    let (span, element_bounded, entity) = match tokens.iter().rposition(|t| words::is_marker(t)) {
        Some(last) if last + 1 == tokens.len() => {
            let start = tokens[..last]
                .iter()
                .rposition(|t| words::is_marker(t))
                .map_or(0, |prev| prev + 1);
            let entity = start.checked_sub(2).map(|i| tokens[i].clone());
            (&tokens[start..last], tokens[last] == ELEMENT_MARKER, entity)
        }
        // After an `element` marker the span names a property of the element.
        Some(marker) => {
            let entity = marker.checked_sub(1).map(|i| tokens[i].clone());
            (&tokens[marker + 1..], false, entity)
        }
        None => (&tokens[..], false, None),
    };

    let mut subject: Vec<String> = span.iter().filter(|t| !droppable(t)).cloned().collect();
    if element_bounded && let Some(last) = subject.last_mut() {
        *last = words::singularize(last);
    }

    let implied: BTreeSet<String> = segments
        .iter()
        .flat_map(|segment| words::tokenize(segment))
        .collect();
    if subject.len() > 1 && implied.contains(&words::singularize(&subject[0])) {
        subject.remove(0);
    }

    if subject.is_empty() {
        let fallback = entity
            .filter(|t| !droppable(t))
            .or_else(|| tokens.iter().rev().find(|t| !droppable(t)).cloned());
        match fallback {
            Some(token) => subject.push(token),
            None => subject = tokens,
        }
    }
    words::to_pascal_case(&subject)
}

/// Log names that occur more than once within one namespace.
fn flag_duplicates(graph: &TypeGraph, tree: &mut NamespaceTree) {
    let namespaces: Vec<_> = tree.iter().map(|ns| (ns.id, ns.members.clone())).collect();
    for (namespace, members) in namespaces {
        let mut by_name: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for ty in &members {
            let node = graph.node(*ty);
            if let Some(name) = node.name() {
                by_name.entry(name).or_default().push(node.label());
            }
        }
        for (name, labels) in by_name.into_iter().filter(|(_, labels)| labels.len() > 1) {
            warn!(name, namespace = %tree.full_name(namespace), "Duplicate type name.");
            tree.push_log(
                namespace,
                format!("duplicate name {name}: {}", labels.join(", ")),
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::graph::{Member, TypeKind};

    fn generated(title: &str, segments: &[&str]) -> String {
        let overrides = Overrides::empty();
        let candidate = TypeNamer::new(&overrides).name_title(title, segments);
        assert!(!candidate.explicit);
        candidate.name
    }

    #[test]
    fn test_entity_noun_fallback() {
        assert_eq!(generated("get_foo_id_ok", &[]), "Foo");
        assert_eq!(generated("get_universe_types_type_id_ok", &["esi", "universe", "type"]), "Type");
    }

    #[test]
    fn test_span_after_marker() {
        assert_eq!(
            generated("get_characters_character_id_blueprints_ok", &["esi", "character"]),
            "Blueprints"
        );
        assert_eq!(
            generated("get_characters_character_id_assets_200_location", &[]),
            "AssetsLocation"
        );
    }

    #[test]
    fn test_element_span_is_singularized() {
        assert_eq!(
            generated("get_characters_character_id_assets_ok_element", &["esi", "character", "asset"]),
            "Asset"
        );
        assert_eq!(generated("get_alliances_ok_element", &[]), "Alliance");
    }

    #[test]
    fn test_array_property_of_element_keeps_plural() {
        let segments = ["esi", "fleet", "wing"];
        assert_eq!(generated("get_fleets_fleet_id_wings_ok_element_squads", &segments), "Squads");
        assert_eq!(
            generated("get_fleets_fleet_id_wings_ok_element_squads_element", &segments),
            "Squad"
        );
        assert_eq!(generated("get_fleets_fleet_id_wings_ok_element", &segments), "Wing");
    }

    #[test]
    fn test_leading_namespace_token_dropped() {
        assert_eq!(
            generated("get_characters_character_id_mail_labels_ok", &["esi", "character", "mail"]),
            "Labels"
        );
        // Never drops the only token.
        assert_eq!(generated("get_characters_character_id_mail_ok", &["esi", "character", "mail"]), "Mail");
    }

    #[test]
    fn test_plain_titles() {
        assert_eq!(generated("not_found", &[]), "NotFound");
        assert_eq!(generated("get_status_ok", &[]), "Status");
        assert_eq!(generated("ok", &[]), "Ok");
    }

    #[test]
    fn test_explicit_titles() {
        let overrides = Overrides::empty().with_type_name("get_status_ok", "ServerStatus");
        let namer = TypeNamer::new(&overrides);
        assert_eq!(
            namer.name_title("get_status_ok", &[]),
            NameCandidate {
                name: "ServerStatus".to_string(),
                explicit: true
            }
        );
        assert!(namer.name_title("PlanetaryPin", &[]).explicit);
        assert!(!namer.name_title("planetary_pin", &[]).explicit);
    }

    #[test]
    fn test_choose_shortest_then_first() {
        let candidates = vec![
            NameCandidate { name: "Foo".to_string(), explicit: false },
            NameCandidate { name: "Bar".to_string(), explicit: false },
            NameCandidate { name: "Longer".to_string(), explicit: false },
        ];
        let (chosen, conflict) = choose("x", &candidates);
        assert_eq!(chosen.name, "Foo");
        assert!(conflict.is_none());
    }

    #[test]
    fn test_choose_explicit_conflict_keeps_first() {
        let candidates = vec![
            NameCandidate { name: "A".to_string(), explicit: false },
            NameCandidate { name: "First".to_string(), explicit: true },
            NameCandidate { name: "Second".to_string(), explicit: true },
            NameCandidate { name: "First".to_string(), explicit: true },
        ];
        let (chosen, conflict) = choose("thing", &candidates);
        assert_eq!(chosen.name, "First");
        let conflict = conflict.unwrap();
        assert_eq!(conflict.claims, vec!["First", "Second"]);
        assert_eq!(conflict.subject, "thing");
    }

    #[test]
    fn test_name_all_flags_conflicts_and_duplicates() {
        let mut graph = TypeGraph::new();
        let a = graph.alloc(TypeKind::Interface, Some("get_foo_id_ok"));
        graph.node_mut(a).add_title("get_bar_id_ok");
        let b = graph.alloc(TypeKind::Interface, Some("Thing"));
        graph.node_mut(b).add_title("OtherThing");
        let c = graph.alloc(TypeKind::Interface, Some("post_foo_id_ok"));
        let root = graph.root();
        for (key, id) in [("a", a), ("b", b), ("c", c)] {
            graph.add_member(root, Member::new(key, id));
        }
        let mut tree = NamespaceTree::new();
        let esi = tree.parse("esi");
        for id in [a, b, c] {
            tree.place(id, esi);
        }

        let overrides = Overrides::empty();
        let named = TypeNamer::new(&overrides).name_all(&mut graph, &mut tree).unwrap();

        assert_eq!(named, 3);
        assert_eq!(graph.node(a).name(), Some("Foo"));
        assert_eq!(graph.node(b).name(), Some("Thing"));
        assert_eq!(graph.node(c).name(), Some("Foo"));
        let log = &tree.get(esi).log;
        assert!(log.iter().any(|l| l.starts_with("conflict: Thing has explicit claims [Thing, OtherThing]")));
        assert!(log.contains(&"duplicate name Foo: get_foo_id_ok, post_foo_id_ok".to_string()));
    }

    #[test]
    fn test_name_all_requires_titles() {
        let mut graph = TypeGraph::new();
        let id = graph.alloc(TypeKind::Interface, None);
        let mut tree = NamespaceTree::new();
        let overrides = Overrides::empty();
        let err = TypeNamer::new(&overrides).name_all(&mut graph, &mut tree).unwrap_err();
        assert!(matches!(err, TypegenError::UnresolvedName(found) if found == id));
    }
}
