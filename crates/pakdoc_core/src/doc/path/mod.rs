use crate::doc::NodeRef;

/// One dot-separated path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSegment<'p> {
	/// Segment text exactly as written.
	pub raw: &'p str,
	/// `(base, index)` split when the segment ends in a `[index]` selector.
	pub indexed: Option<(&'p str, &'p str)>,
}

impl<'p> PathSegment<'p> {
	/// Split an optional trailing `[index]` selector off one segment.
	pub fn parse(raw: &'p str) -> Self {
		let indexed = raw.strip_suffix(']').and_then(|body| {
			let open = body.find('[')?;
			Some((&body[..open], &body[open + 1..]))
		});
		Self { raw, indexed }
	}
}

/// Resolver for paths such as `Field.Child.ArrayChild[5].Descendant`.
///
/// Each segment is first tried as a literal child key. Only on a miss is a
/// trailing `[index]` interpreted, as a lookup of `index` inside the child
/// named by the base. Array elements are keyed by decimal text, so `A.0` and
/// `A[0]` reach the same node.
pub struct PathResolver;

impl PathResolver {
	/// Split a path into segments.
	pub fn segments(path: &str) -> impl Iterator<Item = PathSegment<'_>> {
		path.split('.').map(PathSegment::parse)
	}

	/// Resolve `path` starting below `start`; `None` when any segment misses.
	pub fn resolve<'a>(start: NodeRef<'a>, path: &str) -> Option<NodeRef<'a>> {
		if path.is_empty() {
			return None;
		}

		let mut current = start;
		for segment in Self::segments(path) {
			current = Self::step(current, segment)?;
		}
		Some(current)
	}

	fn step<'a>(node: NodeRef<'a>, segment: PathSegment<'_>) -> Option<NodeRef<'a>> {
		if let Some(found) = node.child(segment.raw) {
			return Some(found);
		}

		let (base, index) = segment.indexed?;
		node.child(base)?.get(index)
	}
}
