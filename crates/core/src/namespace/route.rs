//! Per-route namespace heuristics.

use tracing::trace;

use super::tree::{NamespaceId, NamespaceTree};
use crate::config::NamespaceSettings;
use crate::overrides::Overrides;
use crate::spec::Operation;
use crate::words::{self, ID_MARKER};

impl NamespaceTree {
    /// Candidate namespace for one route and whether it came from an override.
    ///
    /// Without an override the path is `root[.entity].tag[.noun]`:
    /// - `entity` when the id carries `<entity>_id` for a configured entity
    ///   that is not the route's own tag;
    /// - `tag` is the singularized route tag;
    /// - `noun` is the token before the rightmost `id` marker (or the last
    ///   token), dropped when it repeats the tag or the entity.
    pub fn for_route(
        &mut self,
        op: &Operation,
        overrides: &Overrides,
        settings: &NamespaceSettings,
    ) -> (NamespaceId, bool) {
        if let Some(path) = overrides.route_namespace(&op.id) {
            trace!(route = %op.id, namespace = path, "Route namespace override.");
            return (self.parse(path), true);
        }

        let segments = route_segments(op, settings);
        let mut current = self.parse(&settings.root);
        for segment in &segments {
            current = self.ensure(current, segment);
        }
        trace!(route = %op.id, namespace = %self.full_name(current), "Route namespace derived.");
        (current, false)
    }
}

/// Segments appended below the configured root for a route.
fn route_segments(op: &Operation, settings: &NamespaceSettings) -> Vec<String> {
    let tokens = words::tokenize(&op.id);
    let tag = words::segment_name(&op.tag);

    let entity = tokens
        .windows(2)
        .find(|pair| pair[1] == ID_MARKER && settings.entities.contains(&pair[0]))
        .map(|pair| pair[0].clone())
        .filter(|entity| *entity != tag);

    let noun = match tokens.iter().rposition(|token| token == ID_MARKER) {
        Some(marker) if marker > 0 => tokens.get(marker - 1),
        Some(_) => None,
        None => tokens.last(),
    }
    .filter(|token| {
        !words::is_http_method(token) && !words::is_status_token(token) && !words::is_marker(token)
    })
    .map(|token| words::singularize(token))
    .filter(|noun| *noun != tag && Some(noun) != entity.as_ref());

    entity
        .into_iter()
        .chain((!tag.is_empty()).then_some(tag))
        .chain(noun)
        .collect()
}
