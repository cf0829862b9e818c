//! Per-paper resolution against loaded collections
//!
//! Every function here is pure: it reads the paper and the maps it is given
//! and never fetches. Unresolvable references become `None` (or are dropped,
//! for organizations), never errors.

use oparl_model::{
    AgendaItem, AuxiliaryFile, Consultation, FileContent, Meeting, Organization, Paper,
};
use oparl_store::EntityMap;
use serde::Serialize;
use std::sync::Arc;

/// Consultation joined with its meeting and agenda item
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedConsultation<'a> {
    /// The consultation itself
    pub consultation: &'a Consultation,
    /// Meeting it took place in, if known
    pub meeting: Option<&'a Meeting>,
    /// Agenda item within that meeting, if known
    pub agenda_item: Option<&'a AgendaItem>,
}

impl ResolvedConsultation<'_> {
    /// Result recorded on the agenda item
    #[must_use]
    pub fn result(&self) -> Option<&str> {
        self.agenda_item.and_then(AgendaItem::result)
    }
}

/// Attached file joined with its content record
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedFile<'a> {
    /// File metadata from the paper
    pub file: &'a AuxiliaryFile,
    /// Extraction record, if any
    pub content: Option<&'a FileContent>,
}

/// Organizations directing `paper`, unknown ids dropped
#[must_use]
pub fn resolve_organizations<'a>(
    paper: &Paper,
    organizations: &'a EntityMap<Organization>,
) -> Vec<&'a Organization> {
    paper
        .under_direction_of
        .iter()
        .filter_map(|id| organizations.get(id).map(Arc::as_ref))
        .collect()
}

/// Consultations of `paper` in source order
#[must_use]
pub fn resolve_consultations<'a>(
    paper: &'a Paper,
    meetings: &'a EntityMap<Meeting>,
) -> Vec<ResolvedConsultation<'a>> {
    paper
        .consultation
        .iter()
        .map(|consultation| {
            let meeting: Option<&Meeting> = meetings.get(&consultation.meeting).map(Arc::as_ref);
            let agenda_item = meeting.and_then(|m| m.agenda_item(&consultation.agenda_item));
            ResolvedConsultation {
                consultation,
                meeting,
                agenda_item,
            }
        })
        .collect()
}

/// Attached files of `paper` in source order
#[must_use]
pub fn resolve_files<'a>(
    paper: &'a Paper,
    contents: &'a EntityMap<FileContent>,
) -> Vec<ResolvedFile<'a>> {
    paper
        .auxiliary_file
        .iter()
        .map(|file| ResolvedFile {
            file,
            content: contents.get(&file.id).map(Arc::as_ref),
        })
        .collect()
}

/// Loaded collections the resolvers read
///
/// Obtained from [`crate::Archive::resolution`]; resolving never fetches.
#[derive(Debug, Clone)]
pub struct Resolution {
    organizations: Arc<EntityMap<Organization>>,
    meetings: Arc<EntityMap<Meeting>>,
    file_contents: Arc<EntityMap<FileContent>>,
}

impl Resolution {
    /// Bundle loaded collections
    #[must_use]
    pub fn new(
        organizations: Arc<EntityMap<Organization>>,
        meetings: Arc<EntityMap<Meeting>>,
        file_contents: Arc<EntityMap<FileContent>>,
    ) -> Self {
        Self {
            organizations,
            meetings,
            file_contents,
        }
    }

    /// See [`resolve_organizations`]
    #[must_use]
    pub fn organizations(&self, paper: &Paper) -> Vec<&Organization> {
        resolve_organizations(paper, &self.organizations)
    }

    /// See [`resolve_consultations`]
    #[must_use]
    pub fn consultations<'a>(&'a self, paper: &'a Paper) -> Vec<ResolvedConsultation<'a>> {
        resolve_consultations(paper, &self.meetings)
    }

    /// See [`resolve_files`]
    #[must_use]
    pub fn files<'a>(&'a self, paper: &'a Paper) -> Vec<ResolvedFile<'a>> {
        resolve_files(paper, &self.file_contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oparl_test_utils::{
        agenda_item, auxiliary_file, consultation, file_content, meeting, organization, paper,
    };

    fn map<T>(items: Vec<(&str, T)>) -> EntityMap<T> {
        items
            .into_iter()
            .map(|(key, item)| (key.to_string(), Arc::new(item)))
            .collect()
    }

    #[test]
    fn unknown_organizations_are_dropped() {
        let mut p = paper("2024/1", "2024-01-01");
        p.under_direction_of = vec!["o2".into(), "ghost".into(), "o1".into()];
        let orgs = map(vec![
            ("o1", organization("o1", "Gemeinderat")),
            ("o2", organization("o2", "Bauausschuss")),
        ]);

        let names: Vec<_> = resolve_organizations(&p, &orgs)
            .iter()
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(names, vec!["Bauausschuss", "Gemeinderat"]);
    }

    #[test]
    fn consultations_resolve_meeting_and_agenda_item() {
        let mut p = paper("2024/1", "2024-01-01");
        p.consultation = vec![
            consultation("m1", "a2", "Vorberatung"),
            consultation("m1", "a9", "Entscheidung"),
            consultation("m9", "a1", ""),
        ];
        let meetings = map(vec![(
            "m1",
            meeting(
                "m1",
                vec![agenda_item("a1", Some("vertagt")), agenda_item("a2", Some("beschlossen"))],
            ),
        )]);

        let resolved = resolve_consultations(&p, &meetings);
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].result(), Some("beschlossen"));
        assert!(resolved[1].meeting.is_some());
        assert!(resolved[1].agenda_item.is_none());
        assert!(resolved[2].meeting.is_none());
        assert!(resolved[2].agenda_item.is_none());
    }

    #[test]
    fn files_pair_with_content_records() {
        let mut p = paper("2024/1", "2024-01-01");
        p.auxiliary_file = vec![auxiliary_file("f1"), auxiliary_file("f2")];
        let contents = map(vec![("f1", file_content("f1", true))]);

        let resolved = resolve_files(&p, &contents);
        assert_eq!(resolved[0].content.map(|c| c.id.as_str()), Some("f1"));
        assert!(resolved[1].content.is_none());
    }
}
