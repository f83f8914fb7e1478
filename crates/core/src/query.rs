//! Builder for `Object/Get` searches.

use crate::client::{AccessPoint, ServiceCall};

/// Search over content objects.
///
/// All `include*` flags default to on, matching what object pages need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectQuery {
	pub query: String,
	pub sort: Option<String>,
	pub access_point: AccessPoint,
	pub page_index: u32,
	pub page_size: u32,
	pub include_metadata: bool,
	pub include_files: bool,
	pub include_object_relations: bool,
	pub include_access_points: bool,
}

impl ObjectQuery {
	pub fn new(query: impl Into<String>) -> Self {
		Self {
			query: query.into(),
			sort: None,
			access_point: AccessPoint::Default,
			page_index: 0,
			page_size: 10,
			include_metadata: true,
			include_files: true,
			include_object_relations: true,
			include_access_points: true,
		}
	}

	/// Looks up a single object by GUID.
	pub fn by_guid(guid: &str) -> Self {
		Self::new(format!("GUID:{guid}")).page_size(1)
	}

	pub fn sort(mut self, sort: impl Into<String>) -> Self {
		self.sort = Some(sort.into());
		self
	}

	pub fn access_point(mut self, access_point: AccessPoint) -> Self {
		self.access_point = access_point;
		self
	}

	pub fn page(mut self, page_index: u32) -> Self {
		self.page_index = page_index;
		self
	}

	pub fn page_size(mut self, page_size: u32) -> Self {
		self.page_size = page_size;
		self
	}

	/// Toggles every `include*` flag at once.
	pub fn include_all(mut self, include: bool) -> Self {
		self.include_metadata = include;
		self.include_files = include;
		self.include_object_relations = include;
		self.include_access_points = include;
		self
	}

	pub fn into_call(self) -> ServiceCall {
		let mut call = ServiceCall::new("Object", "Get")
			.param("query", self.query)
			.param("pageIndex", self.page_index.to_string())
			.param("pageSize", self.page_size.to_string())
			.param("includeMetadata", flag(self.include_metadata))
			.param("includeFiles", flag(self.include_files))
			.param("includeObjectRelations", flag(self.include_object_relations))
			.param("includeAccessPoints", flag(self.include_access_points));

		if let Some(sort) = self.sort {
			call = call.param("sort", sort);
		}
		call.access_point(self.access_point)
	}
}

/// The service expects .NET-style booleans.
fn flag(value: bool) -> &'static str {
	if value { "True" } else { "False" }
}
