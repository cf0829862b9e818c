//! Testing utilities for the OParl archive workspace
//!
//! Fixture builders for the entity types and an in-memory data source that
//! serves them under [`BASE_URL`].

#![allow(missing_docs)]

use oparl_model::{
    AgendaItem, AuxiliaryFile, ChunkRecord, Consultation, Districts, FileContent, Meeting,
    Organization, Paper,
};
use oparl_store::{Collection, DataSource, MemoryFetcher};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const BASE_URL: &str = "mem://oparl/docs";

pub fn data_source() -> DataSource {
    DataSource::new(BASE_URL)
}

pub fn paper(reference: &str, modified: &str) -> Paper {
    Paper {
        id: format!("https://oparl.example.org/paper/{reference}"),
        name: format!("Vorlage {reference}"),
        reference: reference.to_string(),
        modified: modified.to_string(),
        date: modified.get(..10).unwrap_or(modified).to_string(),
        paper_type: "Antrag".to_string(),
        ..Paper::default()
    }
}

pub fn consultation(meeting: &str, agenda_item: &str, role: &str) -> Consultation {
    Consultation {
        id: format!("{meeting}/consultation/{agenda_item}"),
        meeting: meeting.to_string(),
        agenda_item: agenda_item.to_string(),
        role: role.to_string(),
        ..Consultation::default()
    }
}

pub fn agenda_item(id: &str, result: Option<&str>) -> AgendaItem {
    AgendaItem {
        id: id.to_string(),
        name: format!("TOP {id}"),
        result: result.map(str::to_string),
        ..AgendaItem::default()
    }
}

pub fn meeting(id: &str, items: Vec<AgendaItem>) -> Meeting {
    Meeting {
        id: id.to_string(),
        name: format!("Sitzung {id}"),
        agenda_item: items,
        ..Meeting::default()
    }
}

pub fn organization(id: &str, name: &str) -> Organization {
    Organization {
        id: id.to_string(),
        name: name.to_string(),
        ..Organization::default()
    }
}

pub fn auxiliary_file(id: &str) -> AuxiliaryFile {
    AuxiliaryFile {
        id: id.to_string(),
        name: format!("Anlage {id}"),
        ..AuxiliaryFile::default()
    }
}

pub fn file_content(id: &str, has_extracted_text: bool) -> FileContent {
    FileContent {
        id: id.to_string(),
        has_extracted_text,
        ..FileContent::default()
    }
}

pub fn chunk_record(id: &str, text: &str) -> ChunkRecord {
    ChunkRecord {
        id: id.to_string(),
        extracted_text: text.to_string(),
    }
}

/// Collections served by [`ArchiveFixture::fetcher`]
#[derive(Debug, Clone, Default)]
pub struct ArchiveFixture {
    pub papers: Vec<Paper>,
    pub meetings: Vec<Meeting>,
    pub organizations: Vec<Organization>,
    pub file_contents: Vec<FileContent>,
    pub stadtteile: Map<String, Value>,
    pub chunks: Vec<Vec<ChunkRecord>>,
}

impl ArchiveFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paper(mut self, paper: Paper) -> Self {
        self.papers.push(paper);
        self
    }

    pub fn with_meeting(mut self, meeting: Meeting) -> Self {
        self.meetings.push(meeting);
        self
    }

    pub fn with_organization(mut self, organization: Organization) -> Self {
        self.organizations.push(organization);
        self
    }

    pub fn with_file_content(mut self, content: FileContent) -> Self {
        self.file_contents.push(content);
        self
    }

    /// Raw `paper-stadtteile.json` entry (string, array or anything else)
    pub fn with_stadtteile(mut self, reference: &str, value: Value) -> Self {
        self.stadtteile.insert(reference.to_string(), value);
        self
    }

    pub fn with_chunk(mut self, records: Vec<ChunkRecord>) -> Self {
        self.chunks.push(records);
        self
    }

    /// Install every collection into `fetcher`
    pub fn install(&self, fetcher: &MemoryFetcher) {
        let source = data_source();
        fetcher.insert_json(source.url(Collection::Papers), &self.papers).unwrap();
        fetcher.insert_json(source.url(Collection::Meetings), &self.meetings).unwrap();
        fetcher
            .insert_json(source.url(Collection::Organizations), &self.organizations)
            .unwrap();
        fetcher
            .insert_json(source.url(Collection::FileContents), &self.file_contents)
            .unwrap();
        fetcher
            .insert_json(source.url(Collection::PaperStadtteile), &self.stadtteile)
            .unwrap();
        for (index, chunk) in self.chunks.iter().enumerate() {
            fetcher.insert_json(source.chunk_url(index), chunk).unwrap();
        }
    }

    pub fn fetcher(&self) -> Arc<MemoryFetcher> {
        let fetcher = Arc::new(MemoryFetcher::new());
        self.install(&fetcher);
        fetcher
    }
}

/// Small but complete archive
///
/// - `2024/0815`: directed by the council, consulted twice (last result
///   `beschlossen`), mentions Durlach and Oststadt, one file with text
/// - `2024/0816`: no organization, no consultation, no district
/// - `2023/0100`: deleted
/// - `2019/0042`: bulk-import stamp, year bucket 2019, result `vertagt`
pub fn sample_archive() -> ArchiveFixture {
    let mut directed = paper("2024/0815", "2024-11-02T08:00:00Z");
    directed.under_direction_of = vec!["org/gr".to_string(), "org/missing".to_string()];
    directed.consultation = vec![
        consultation("meeting/1", "item/1", "Vorberatung"),
        consultation("meeting/2", "item/2", "Entscheidung"),
    ];
    directed.auxiliary_file = vec![auxiliary_file("file/1"), auxiliary_file("file/2")];

    let mut plain = paper("2024/0816", "2024-10-15T12:00:00Z");
    plain.paper_type = "Anfrage".to_string();

    let mut deleted = paper("2023/0100", "2023-05-01T00:00:00Z");
    deleted.deleted = true;

    let mut bulk = paper("2019/0042", "2025-03-03T10:00:00Z");
    bulk.date = "2019-07-01".to_string();
    bulk.paper_type = "Beschlussvorlage".to_string();
    bulk.under_direction_of = vec!["org/hv".to_string()];
    bulk.consultation = vec![consultation("meeting/3", "item/3", "")];

    ArchiveFixture::new()
        .with_paper(plain)
        .with_paper(bulk)
        .with_paper(directed)
        .with_paper(deleted)
        .with_meeting(meeting(
            "meeting/1",
            vec![agenda_item("item/1", Some("verwiesen"))],
        ))
        .with_meeting(meeting(
            "meeting/2",
            vec![
                agenda_item("item/0", Some("zurückgestellt")),
                agenda_item("item/2", Some("beschlossen")),
            ],
        ))
        .with_meeting(meeting("meeting/3", vec![agenda_item("item/3", Some("vertagt"))]))
        .with_organization(organization("org/gr", "Gemeinderat"))
        .with_organization(organization("org/hv", "Hauptverwaltung"))
        .with_file_content(file_content("file/1", true))
        .with_file_content(file_content("file/2", false))
        .with_stadtteile("2024/0815", Value::from(vec!["Durlach", " Oststadt", "Durlach"]))
        .with_stadtteile("2023/0100", Value::from("Weststadt"))
        .with_chunk(vec![chunk_record("file/1", "Haushaltsplan 2025")])
}

/// Districts for a list of names
pub fn districts(names: &[&str]) -> Districts {
    Districts::from_names(names)
}
