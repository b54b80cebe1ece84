// User directory feeding the callsign database

use super::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

/// One DMR user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub call: String,
    pub name: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

/// Record of the radioid.net user dump
#[derive(Debug, Deserialize)]
struct RadioIdUser {
    radio_id: u32,
    #[serde(default)]
    callsign: String,
    #[serde(default)]
    fname: String,
    #[serde(default)]
    surname: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct RadioIdDump {
    users: Vec<RadioIdUser>,
}

impl From<RadioIdUser> for User {
    fn from(u: RadioIdUser) -> Self {
        let name = match (u.fname.trim(), u.surname.trim()) {
            (first, "") => first.to_string(),
            ("", last) => last.to_string(),
            (first, last) => format!("{} {}", first, last),
        };
        User {
            id: u.radio_id,
            call: u.callsign,
            name,
            city: u.city,
            state: u.state,
            country: u.country,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserDatabase {
    users: Vec<User>,
}

impl UserDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a radioid.net JSON dump
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let dump: RadioIdDump = serde_json::from_reader(reader)?;
        Ok(Self {
            users: dump.users.into_iter().map(User::from).collect(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_reader(json.as_bytes())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let db = Self::from_reader(BufReader::new(file))?;
        info!("Loaded {} users from {}", db.len(), path.as_ref().display());
        Ok(db)
    }

    pub fn add(&mut self, user: User) {
        self.users.push(user);
    }

    pub fn user(&self, n: usize) -> Option<&User> {
        self.users.get(n)
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Order users by distance to `id`, so that a limited selection keeps
    /// the users closest to it (usually the own region)
    pub fn sort_by_proximity(&mut self, id: u32) {
        self.users.sort_by_key(|u| u.id.abs_diff(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DUMP: &str = r#"{"users": [
        {"radio_id": 2621370, "callsign": "DM3MAT", "fname": "Hannes", "surname": "M",
         "city": "Berlin", "state": "Berlin", "country": "Germany"},
        {"radio_id": 3100001, "callsign": "W1AW", "fname": "Hiram",
         "city": "Newington", "state": "CT", "country": "United States"}
    ]}"#;

    #[test]
    fn test_parse_radioid_dump() {
        let db = UserDatabase::from_json(DUMP).unwrap();
        assert_eq!(db.len(), 2);
        let user = db.user(0).unwrap();
        assert_eq!(user.id, 2621370);
        assert_eq!(user.call, "DM3MAT");
        assert_eq!(user.name, "Hannes M");
        assert_eq!(db.user(1).unwrap().name, "Hiram");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DUMP.as_bytes()).unwrap();
        let db = UserDatabase::load(file.path()).unwrap();
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn test_malformed_dump() {
        assert!(UserDatabase::from_json(r#"{"people": []}"#).is_err());
    }

    #[test]
    fn test_proximity_sort() {
        let mut db = UserDatabase::from_json(DUMP).unwrap();
        db.sort_by_proximity(3_000_000);
        assert_eq!(db.user(0).unwrap().call, "W1AW");
    }
}
