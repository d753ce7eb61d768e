//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Section payloads are stored
//! as compact JSON. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use harvest_core::{
  cover::{Cover, CoverPatch},
  store::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── Covers ──────────────────────────────────────────────────────────────────

/// A cover row as read from (or written to) SQLite — strings and integers
/// only, so the row can cross the `tokio_rusqlite` closure boundary without
/// parsing.
#[derive(Debug, Clone)]
pub struct RawCover {
  pub cover_id:            String,
  pub created_at:          String,
  pub enumerator_name:     String,
  pub enumerator_code:     String,
  pub country:             String,
  pub region:              String,
  pub district:            String,
  pub society:             String,
  pub society_code:        String,
  pub farmer_code:         String,
  pub farmer_surname:      String,
  pub farmer_first_name:   String,
  pub risk_classification: String,
  pub client:              String,
  pub num_farmer_children: i64,
  pub list_children:       String,
}

pub fn cover_to_raw(cover: &Cover) -> RawCover {
  RawCover {
    cover_id:            encode_uuid(cover.cover_id),
    created_at:          encode_dt(cover.created_at),
    enumerator_name:     cover.enumerator_name.clone(),
    enumerator_code:     cover.enumerator_code.clone(),
    country:             cover.country.clone(),
    region:              cover.region.clone(),
    district:            cover.district.clone(),
    society:             cover.society.clone(),
    society_code:        cover.society_code.clone(),
    farmer_code:         cover.farmer_code.clone(),
    farmer_surname:      cover.farmer_surname.clone(),
    farmer_first_name:   cover.farmer_first_name.clone(),
    risk_classification: cover.risk_classification.clone(),
    client:              cover.client.clone(),
    num_farmer_children: i64::from(cover.num_farmer_children),
    list_children:       cover.list_children.clone(),
  }
}

impl RawCover {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawCover {
      cover_id:            row.get(0)?,
      created_at:          row.get(1)?,
      enumerator_name:     row.get(2)?,
      enumerator_code:     row.get(3)?,
      country:             row.get(4)?,
      region:              row.get(5)?,
      district:            row.get(6)?,
      society:             row.get(7)?,
      society_code:        row.get(8)?,
      farmer_code:         row.get(9)?,
      farmer_surname:      row.get(10)?,
      farmer_first_name:   row.get(11)?,
      risk_classification: row.get(12)?,
      client:              row.get(13)?,
      num_farmer_children: row.get(14)?,
      list_children:       row.get(15)?,
    })
  }

  /// Overlay a partial update. String fields copy straight in; the count
  /// field converts to the stored integer width.
  pub fn apply_patch(&mut self, patch: &CoverPatch) {
    macro_rules! set {
      ($field:ident) => {
        if let Some(v) = &patch.$field {
          self.$field = v.clone();
        }
      };
    }
    set!(enumerator_name);
    set!(enumerator_code);
    set!(country);
    set!(region);
    set!(district);
    set!(society);
    set!(society_code);
    set!(farmer_code);
    set!(farmer_surname);
    set!(farmer_first_name);
    set!(risk_classification);
    set!(client);
    if let Some(v) = patch.num_farmer_children {
      self.num_farmer_children = i64::from(v);
    }
    set!(list_children);
  }

  pub fn into_cover(self) -> Result<Cover> {
    Ok(Cover {
      cover_id:            decode_uuid(&self.cover_id)?,
      created_at:          decode_dt(&self.created_at)?,
      enumerator_name:     self.enumerator_name,
      enumerator_code:     self.enumerator_code,
      country:             self.country,
      region:              self.region,
      district:            self.district,
      society:             self.society,
      society_code:        self.society_code,
      farmer_code:         self.farmer_code,
      farmer_surname:      self.farmer_surname,
      farmer_first_name:   self.farmer_first_name,
      risk_classification: self.risk_classification,
      client:              self.client,
      num_farmer_children: u32::try_from(self.num_farmer_children)
        .map_err(|e| Error::Decode(e.to_string()))?,
      list_children:       self.list_children,
    })
  }
}

/// Column list shared by every cover SELECT, in `RawCover::from_row` order.
pub const COVER_COLUMNS: &str = "cover_id, created_at, enumerator_name, \
  enumerator_code, country, region, district, society, society_code, \
  farmer_code, farmer_surname, farmer_first_name, risk_classification, \
  client, num_farmer_children, list_children";

/// Insert a cover row; usable inside or outside a transaction.
pub fn insert_cover(
  conn: &rusqlite::Connection,
  raw: &RawCover,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO covers (
       cover_id, created_at, enumerator_name, enumerator_code, country,
       region, district, society, society_code, farmer_code, farmer_surname,
       farmer_first_name, risk_classification, client, num_farmer_children,
       list_children
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
       ?15, ?16)",
    rusqlite::params![
      raw.cover_id,
      raw.created_at,
      raw.enumerator_name,
      raw.enumerator_code,
      raw.country,
      raw.region,
      raw.district,
      raw.society,
      raw.society_code,
      raw.farmer_code,
      raw.farmer_surname,
      raw.farmer_first_name,
      raw.risk_classification,
      raw.client,
      raw.num_farmer_children,
      raw.list_children,
    ],
  )?;
  Ok(())
}

/// Rewrite every mutable column of an existing cover row.
pub fn update_cover_row(
  conn: &rusqlite::Connection,
  raw: &RawCover,
) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE covers SET
       enumerator_name = ?2, enumerator_code = ?3, country = ?4,
       region = ?5, district = ?6, society = ?7, society_code = ?8,
       farmer_code = ?9, farmer_surname = ?10, farmer_first_name = ?11,
       risk_classification = ?12, client = ?13, num_farmer_children = ?14,
       list_children = ?15
     WHERE cover_id = ?1",
    rusqlite::params![
      raw.cover_id,
      raw.enumerator_name,
      raw.enumerator_code,
      raw.country,
      raw.region,
      raw.district,
      raw.society,
      raw.society_code,
      raw.farmer_code,
      raw.farmer_surname,
      raw.farmer_first_name,
      raw.risk_classification,
      raw.client,
      raw.num_farmer_children,
      raw.list_children,
    ],
  )?;
  Ok(())
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub struct RawUser {
  pub user_id:    String,
  pub username:   String,
  pub email:      Option<String>,
  pub created_at: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawUser {
      user_id:    row.get(0)?,
      username:   row.get(1)?,
      email:      row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      username:   self.username,
      email:      self.email,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
