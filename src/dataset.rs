//! Graph-partitioned quad container.
use crate::Quad;
use std::{
	collections::{btree_map, hash_map::RandomState, BTreeMap, HashMap},
	hash::BuildHasher,
};

/// Name of the graph holding quads without graph label.
pub const DEFAULT_GRAPH: &str = "@default";

/// RDF Dataset.
///
/// Maps each graph name to the [`Graph`] of quads stated in it.
/// Graphs are iterated in graph name order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dataset {
	graphs: BTreeMap<String, Graph>,
}

impl Dataset {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a quad in the graph named by `quad.graph`, creating the graph
	/// if needed.
	///
	/// Returns `false` and leaves the dataset unchanged if an equal quad is
	/// already in this graph.
	pub(crate) fn insert(&mut self, quad: Quad) -> bool {
		match self.graphs.get_mut(&quad.graph) {
			Some(graph) => graph.insert(quad),
			None => {
				let mut graph = Graph::default();
				let name = quad.graph.clone();
				graph.insert(quad);
				self.graphs.insert(name, graph);
				true
			}
		}
	}

	/// Checks if the dataset contains no quads.
	pub fn is_empty(&self) -> bool {
		self.graphs.is_empty()
	}

	/// Total number of quads, all graphs included.
	pub fn len(&self) -> usize {
		self.graphs.values().map(Graph::len).sum()
	}

	pub fn graph_count(&self) -> usize {
		self.graphs.len()
	}

	pub fn graph(&self, name: &str) -> Option<&Graph> {
		self.graphs.get(name)
	}

	pub fn default_graph(&self) -> Option<&Graph> {
		self.graph(DEFAULT_GRAPH)
	}

	pub fn graphs(&self) -> Graphs {
		Graphs(self.graphs.iter())
	}

	pub fn graph_names(&self) -> impl Iterator<Item = &str> {
		self.graphs.keys().map(String::as_str)
	}

	/// Iterates over all the quads, graph by graph.
	pub fn quads(&self) -> impl Iterator<Item = &Quad> {
		self.graphs.values().flat_map(Graph::iter)
	}

	pub fn contains(&self, quad: &Quad) -> bool {
		self.graph(&quad.graph)
			.map(|g| g.contains(quad))
			.unwrap_or(false)
	}
}

impl FromIterator<Quad> for Dataset {
	fn from_iter<I: IntoIterator<Item = Quad>>(iter: I) -> Self {
		let mut dataset = Self::new();
		for quad in iter {
			dataset.insert(quad);
		}

		dataset
	}
}

/// Iterator over the graphs of a [`Dataset`] with their names.
pub struct Graphs<'a>(btree_map::Iter<'a, String, Graph>);

impl<'a> Iterator for Graphs<'a> {
	type Item = (&'a str, &'a Graph);

	fn next(&mut self) -> Option<Self::Item> {
		self.0.next().map(|(name, graph)| (name.as_str(), graph))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.0.size_hint()
	}
}

impl<'a> IntoIterator for &'a Dataset {
	type Item = (&'a str, &'a Graph);
	type IntoIter = Graphs<'a>;

	fn into_iter(self) -> Self::IntoIter {
		self.graphs()
	}
}

impl IntoIterator for Dataset {
	type Item = (String, Graph);
	type IntoIter = btree_map::IntoIter<String, Graph>;

	fn into_iter(self) -> Self::IntoIter {
		self.graphs.into_iter()
	}
}

/// Quads of a single graph, without duplicates, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	quads: Vec<Quad>,

	/// Positions in `quads`, by quad hash.
	index: HashMap<u64, Vec<usize>>,
	hasher: RandomState,
}

impl Graph {
	fn insert(&mut self, quad: Quad) -> bool {
		let positions = self
			.index
			.entry(self.hasher.hash_one(&quad))
			.or_default();
		if positions.iter().any(|&i| self.quads[i] == quad) {
			false
		} else {
			positions.push(self.quads.len());
			self.quads.push(quad);
			true
		}
	}

	pub fn is_empty(&self) -> bool {
		self.quads.is_empty()
	}

	pub fn len(&self) -> usize {
		self.quads.len()
	}

	pub fn contains(&self, quad: &Quad) -> bool {
		self.index
			.get(&self.hasher.hash_one(quad))
			.map(|positions| positions.iter().any(|&i| self.quads[i] == *quad))
			.unwrap_or(false)
	}

	pub fn iter(&self) -> std::slice::Iter<Quad> {
		self.quads.iter()
	}

	pub fn as_slice(&self) -> &[Quad] {
		&self.quads
	}
}

impl PartialEq for Graph {
	fn eq(&self, other: &Self) -> bool {
		self.quads == other.quads
	}
}

impl Eq for Graph {}

impl<'a> IntoIterator for &'a Graph {
	type Item = &'a Quad;
	type IntoIter = std::slice::Iter<'a, Quad>;

	fn into_iter(self) -> Self::IntoIter {
		self.quads.iter()
	}
}

impl IntoIterator for Graph {
	type Item = Quad;
	type IntoIter = std::vec::IntoIter<Quad>;

	fn into_iter(self) -> Self::IntoIter {
		self.quads.into_iter()
	}
}
