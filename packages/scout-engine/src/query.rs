//! Predicate tree for engine queries and its rendering to the engine's YQL dialect.
//!
//! Quoting happens only in [`Predicate::render`]; builders construct nodes from raw user text.

use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
	/// Matches every document.
	True,
	Lexical { fields: Vec<String>, text: String, mode: LexicalMode },
	/// Approximate nearest neighbors of the vector bound to `param`.
	NearestNeighbor { field: String, param: String, target_hits: u32 },
	Equals { field: String, value: Literal },
	/// Inclusive on both ends.
	Range { field: String, min: Option<i64>, max: Option<i64> },
	Contains { field: String, value: String },
	And(Vec<Predicate>),
	Or(Vec<Predicate>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexicalMode {
	/// Weak AND over the field matches: documents need not match every field.
	WeakAnd { target_hits: u32 },
	/// Plain disjunction over the field matches.
	Any,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
	Str(String),
	Bool(bool),
	Int(i64),
}

impl Predicate {
	pub fn equals(field: &str, value: Literal) -> Self {
		Self::Equals { field: field.to_string(), value }
	}

	pub fn contains(field: &str, value: &str) -> Self {
		Self::Contains { field: field.to_string(), value: value.to_string() }
	}

	/// Renders the predicate as a YQL `where` expression.
	pub fn render(&self) -> String {
		let mut out = String::new();

		self.render_into(&mut out);

		out
	}

	/// True when any node in the tree satisfies `f`.
	pub fn any(&self, f: &impl Fn(&Predicate) -> bool) -> bool {
		if f(self) {
			return true;
		}

		match self {
			Self::And(nodes) | Self::Or(nodes) => nodes.iter().any(|node| node.any(f)),
			_ => false,
		}
	}

	pub fn has_nearest_neighbor(&self) -> bool {
		self.any(&|node| matches!(node, Self::NearestNeighbor { .. }))
	}

	pub fn has_lexical(&self) -> bool {
		self.any(&|node| matches!(node, Self::Lexical { .. }))
	}

	fn render_into(&self, out: &mut String) {
		match self {
			Self::True => out.push_str("true"),
			Self::Lexical { fields, text, mode } => render_lexical(out, fields, text, *mode),
			Self::NearestNeighbor { field, param, target_hits } => {
				let _ = write!(out, "({{targetHits:{target_hits}}}nearestNeighbor({field}, {param}))");
			},
			Self::Equals { field, value } => match value {
				Literal::Str(value) => render_contains(out, field, value),
				Literal::Bool(value) => {
					let _ = write!(out, "{field} = {value}");
				},
				Literal::Int(value) => {
					let _ = write!(out, "{field} = {value}");
				},
			},
			Self::Range { field, min, max } => match (min, max) {
				(Some(min), Some(max)) => {
					let _ = write!(out, "({field} >= {min} and {field} <= {max})");
				},
				(Some(min), None) => {
					let _ = write!(out, "{field} >= {min}");
				},
				(None, Some(max)) => {
					let _ = write!(out, "{field} <= {max}");
				},
				(None, None) => out.push_str("true"),
			},
			Self::Contains { field, value } => render_contains(out, field, value),
			Self::And(nodes) => render_group(out, nodes, " and "),
			Self::Or(nodes) => render_group(out, nodes, " or "),
		}
	}
}

/// Escapes a user-supplied string for use inside a double-quoted YQL literal.
pub fn escape(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());

	for ch in raw.chars() {
		match ch {
			'\\' => out.push_str("\\\\"),
			'"' => out.push_str("\\\""),
			'\n' | '\r' | '\t' => out.push(' '),
			_ => out.push(ch),
		}
	}

	out
}

fn render_contains(out: &mut String, field: &str, value: &str) {
	let _ = write!(out, "{field} contains \"{}\"", escape(value));
}

fn render_lexical(out: &mut String, fields: &[String], text: &str, mode: LexicalMode) {
	let escaped = escape(text);
	let terms =
		fields.iter().map(|field| format!("{field} contains \"{escaped}\"")).collect::<Vec<_>>();

	match mode {
		LexicalMode::WeakAnd { target_hits } => {
			let _ = write!(out, "({{targetHits:{target_hits}}}weakAnd({}))", terms.join(", "));
		},
		LexicalMode::Any => {
			let _ = write!(out, "({})", terms.join(" or "));
		},
	}
}

fn render_group(out: &mut String, nodes: &[Predicate], separator: &str) {
	match nodes {
		[] => out.push_str("true"),
		[single] => single.render_into(out),
		_ => {
			out.push('(');

			for (i, node) in nodes.iter().enumerate() {
				if i > 0 {
					out.push_str(separator);
				}

				node.render_into(out);
			}

			out.push(')');
		},
	}
}
