use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One team membership on a plan, as delivered by the scheduling service.
/// The same person shows up once per team they serve on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub person_id: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// A service plan snapshot as fetched from the scheduling service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePlan {
    pub id: String,
    pub date: String,
    pub title: String,
    pub series: String,
    pub people: Vec<TeamMember>,
    pub notes: Vec<String>,
}

/// A scheduled person after all of their memberships are merged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    pub roles: Vec<String>,
    pub photo_url: Option<String>,
}

impl Person {
    pub fn primary_role(&self) -> Option<&str> {
        self.roles.first().map(String::as_str)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Merges membership records into one entry per person id, keeping
/// first-seen order.
///
/// Name and photo come from the first record that carries them. Roles and
/// team names are collected into a single duplicate-free list in the order
/// they first appear.
pub fn consolidate(members: &[TeamMember]) -> Vec<Person> {
    let mut people: Vec<Person> = Vec::new();
    let mut index_by_id: HashMap<&str, usize> = HashMap::new();

    for member in members {
        let idx = *index_by_id.entry(member.person_id.as_str()).or_insert_with(|| {
            people.push(Person {
                id: member.person_id.clone(),
                name: String::new(),
                roles: Vec::new(),
                photo_url: None,
            });
            people.len() - 1
        });
        let person = &mut people[idx];

        if person.name.is_empty() && !member.name.trim().is_empty() {
            person.name = member.name.clone();
        }
        if person.photo_url.is_none() {
            person.photo_url = non_empty(&member.photo_url).map(str::to_string);
        }
        for label in [non_empty(&member.role), non_empty(&member.team)].into_iter().flatten() {
            if !person.roles.iter().any(|r| r == label) {
                person.roles.push(label.to_string());
            }
        }
    }

    people
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, name: &str, role: Option<&str>, team: Option<&str>, photo: Option<&str>) -> TeamMember {
        TeamMember {
            person_id: id.to_string(),
            name: name.to_string(),
            role: role.map(str::to_string),
            team: team.map(str::to_string),
            photo_url: photo.map(str::to_string),
        }
    }

    #[test]
    fn empty_roster_consolidates_to_nothing() {
        assert!(consolidate(&[]).is_empty());
    }

    #[test]
    fn repeated_memberships_merge_roles_in_first_seen_order() {
        let members = vec![
            member("7", "Sam Lee", Some("Lead Vocal"), Some("Vocals"), Some("http://img/7")),
            member("8", "Ana Ruiz", Some("Keys"), Some("Band"), None),
            member("7", "Sam Lee", Some("Acoustic"), Some("Band"), None),
            member("7", "Sam Lee", Some("Lead Vocal"), Some("Vocals"), Some("http://img/other")),
        ];

        let people = consolidate(&members);
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].id, "7");
        assert_eq!(people[0].roles, vec!["Lead Vocal", "Vocals", "Acoustic", "Band"]);
        assert_eq!(people[0].photo_url.as_deref(), Some("http://img/7"));
        assert_eq!(people[1].id, "8");
        assert_eq!(people[1].primary_role(), Some("Keys"));
    }

    #[test]
    fn blank_fields_contribute_nothing_and_are_filled_later() {
        let members = vec![
            member("3", "Kim", Some(""), None, Some("")),
            member("3", "Kim Alt", None, Some("Production"), Some("http://img/3")),
        ];

        let people = consolidate(&members);
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name, "Kim");
        assert_eq!(people[0].roles, vec!["Production"]);
        assert_eq!(people[0].photo_url.as_deref(), Some("http://img/3"));
    }
}
