//! Runtime configuration: server binding, data directory and the bay roster.
//!
//! The bay roster is fixed for the process lifetime. It comes from an
//! optional TOML file when one is configured; otherwise the built-in seed
//! roster below is used. The seed mirrors the physical layout of the dock:
//! FG doors 13/14/16 with two slots each, PK doors 17/19/21 with two slots
//! each plus the three factory pickup points, and the two RM drop points.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::api::{Bay, BayId, BayStatus, VehicleClass};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("roster file unreadable: {0}")]
    Read(#[source] std::io::Error),

    #[error("roster file invalid: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("roster file lists no bays")]
    EmptyRoster,
}

/// Server process configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Optional TOML file replacing the built-in bay roster.
    pub roster_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Read `HOST`, `PORT`, `DATA_DIR` and `ROSTER_FILE` with the usual
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            roster_file: env::var("ROSTER_FILE").ok().map(PathBuf::from),
        }
    }

    /// Resolve the bay roster: the configured file when present, the seed
    /// roster otherwise.
    pub fn roster(&self) -> Result<Vec<Bay>, ConfigError> {
        match &self.roster_file {
            Some(path) => load_roster(path),
            None => Ok(default_bays()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(default)]
    bays: Vec<RosterEntry>,
}

#[derive(Debug, Deserialize)]
struct RosterEntry {
    id: String,
    door: String,
    #[serde(default)]
    label: String,
    class: VehicleClass,
}

/// Load a bay roster from a TOML file.
///
/// ```toml
/// [[bays]]
/// id = "FG-13-1"
/// door = "13"
/// label = "ช่อง 1"
/// class = "FG"
/// ```
pub fn load_roster(path: &Path) -> Result<Vec<Bay>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
    let parsed: RosterFile = toml::from_str(&raw)?;
    if parsed.bays.is_empty() {
        return Err(ConfigError::EmptyRoster);
    }
    Ok(parsed
        .bays
        .into_iter()
        .map(|entry| Bay {
            id: BayId::new(entry.id),
            door: entry.door,
            label: entry.label,
            vehicle_class: entry.class,
            current_queue_id: None,
            status: BayStatus::Idle,
        })
        .collect())
}

fn bay(id: &str, door: &str, label: &str, class: VehicleClass) -> Bay {
    Bay {
        id: BayId::new(id),
        door: door.to_string(),
        label: label.to_string(),
        vehicle_class: class,
        current_queue_id: None,
        status: BayStatus::Idle,
    }
}

/// The built-in bay roster.
pub fn default_bays() -> Vec<Bay> {
    use VehicleClass::*;
    vec![
        // FG doors 13, 14, 16 (2 slots each)
        bay("FG-13-1", "13", "ช่อง 1", Fg),
        bay("FG-13-2", "13", "ช่อง 2", Fg),
        bay("FG-14-1", "14", "ช่อง 1", Fg),
        bay("FG-14-2", "14", "ช่อง 2", Fg),
        bay("FG-16-1", "16", "ช่อง 1", Fg),
        bay("FG-16-2", "16", "ช่อง 2", Fg),
        // PK doors 17, 19, 21 (2 slots each)
        bay("PK-17-1", "17", "ช่อง 1", Pk),
        bay("PK-17-2", "17", "ช่อง 2", Pk),
        bay("PK-19-1", "19", "ช่อง 1", Pk),
        bay("PK-19-2", "19", "ช่อง 2", Pk),
        bay("PK-21-1", "21", "ช่อง 1", Pk),
        bay("PK-21-2", "21", "ช่อง 2", Pk),
        // PK factory pickup points
        bay("PK-A", "โรงA", "จุดรับสินค้า", Pk),
        bay("PK-E", "โรงE", "จุดรับสินค้า", Pk),
        bay("PK-B", "โรงB", "จุดรับสินค้า", Pk),
        // RM drop points
        bay("RM-P1", "จุดรับของ", "", Rm),
        bay("RM-P2", "จุดลงข้าว", "", Rm),
    ]
}

/// CP destination centers offered by the registration form.
pub const CP_DESTINATIONS: &[&str] = &[
    "ชลบุรี",
    "หาดใหญ่",
    "นครสวรรค์",
    "บุรีรัมย์",
    "ขอนแก่น",
    "บางบัวทอง",
    "สุวรรณภูมิ",
    "ลำพูน",
    "สุราษฎร์ธานี",
    "มหาชัย",
];

/// General customers offered by the registration form.
pub const GENERAL_CUSTOMERS: &[&str] = &[
    "ล ธนวงศ์",
    "โนเบิ้ล",
    "บ้านออนไลน์",
    "ย้งรุ่งเรือง",
    "สุวัฒน์ เดโชกุล",
    "C&P",
    "เอมธรรม รองเมือง",
    "บีกิน ฟู้ดแอนด์เฮลท์",
    "เดโมพาวเวอร์",
    "UM Food",
    "โฮคิทเช่น",
    "ไวเซอร์ พัฒนาการ",
    "พรรษา พาเพลิน (BPALL)",
    "เอมธรรม ดอนเมือง",
    "ซีเล็คดอนเมือง",
    "กิมเฮง บางกะปิ",
    "มาคัส",
    "เว็ปเอสพีที",
    "มุ่งพัฒนา (MPI)",
    "อาหารสุขภาพดี",
    "100 Yen",
    "วิลล่า",
    "B-Best ลาดกระบัง",
    "NFB",
    "อูมาอิ",
    "Well-grow",
    "All Complex",
    "เซ็นทรัลฟู้ดรีเทล (Tops)",
    "Lotus บางบัวทอง",
    "FB Food",
    "สมกวี",
    "นีโอสุกี้",
    "เอมธรรม กิ่งแก้ว",
    "EVA",
    "LaZada",
    "LinFox",
    "อิออน",
    "DIY",
    "ฟู้ดโค้ตติ้ง (FCI)",
    "ตันตราภัณฑ์",
    "Big C ครอสด็อก-ธัญบุรี",
    "กริฟฟิท",
    "The Mall",
    "Family Mart",
    "BLUE & WHITE",
    "แมสมาร์เก็ตติ้ง",
    "KJR บ้านโป่ง",
    "CJ Express โพธาราม",
    "ปิโตรเลียมไทย วังน้อย",
    "ปตท. วังน้อย",
    "R&B",
    "Lotus วังน้อย",
    "CJ Express บางปะกง",
    "CJ Express ขอนแก่น",
    "สปริง",
    "ริชชี่ไรท์",
];
