//! [`SqliteStore`] — the SQLite implementation of [`InterviewStore`] and
//! [`AuthStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use harvest_core::{
  cover::{Cover, CoverPatch},
  sections::{SectionData, SectionRecord, Sections},
  store::{AuthStore, InterviewStore, User},
  sync::Interview,
};

use crate::{
  Error, Result,
  encode::{
    self, COVER_COLUMNS, RawCover, RawUser, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A harvest survey store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// on one store are serialised onto the connection's worker thread, and the
/// nested interview operations additionally run inside an explicit
/// transaction, so no partially applied interview is ever observable.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn =
      tokio_rusqlite::Connection::open(path.as_ref().to_path_buf()).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Closure-side helpers ────────────────────────────────────────────────────

/// Read the raw `(key, json)` pairs of every section attached to a cover.
fn read_raw_sections(
  conn: &rusqlite::Connection,
  cover_id: &str,
) -> rusqlite::Result<Vec<(&'static str, String)>> {
  let mut out = Vec::new();
  for key in Sections::KEYS {
    let json: Option<String> = conn
      .query_row(
        &format!("SELECT data FROM {key} WHERE cover_id = ?1"),
        rusqlite::params![cover_id],
        |row| row.get(0),
      )
      .optional()?;
    if let Some(json) = json {
      out.push((key, json));
    }
  }
  Ok(out)
}

fn read_raw_cover(
  conn: &rusqlite::Connection,
  cover_id: &str,
) -> rusqlite::Result<Option<RawCover>> {
  conn
    .query_row(
      &format!("SELECT {COVER_COLUMNS} FROM covers WHERE cover_id = ?1"),
      rusqlite::params![cover_id],
      |row| RawCover::from_row(row),
    )
    .optional()
}

// ─── Caller-side helpers ─────────────────────────────────────────────────────

fn decode_sections(raws: Vec<(&'static str, String)>) -> Result<Sections> {
  let mut sections = Sections::default();
  for (key, json) in raws {
    let value: serde_json::Value = serde_json::from_str(&json)?;
    sections.insert_raw(key, value)?;
  }
  Ok(sections)
}

/// Serialise the present sections into insertable rows, each with a fresh
/// section id.
fn section_rows(
  sections: &Sections,
) -> Result<Vec<(&'static str, String, String)>> {
  let mut rows = Vec::new();
  for (key, value) in sections.present()? {
    rows.push((key, encode_uuid(Uuid::new_v4()), value.to_string()));
  }
  Ok(rows)
}

/// A section row in transit across the closure boundary.
type RawSection = (String, String, String, String);

fn decode_section<T: SectionData>(
  raw: RawSection,
) -> Result<SectionRecord<T>> {
  let (section_id, cover_id, json, recorded_at) = raw;
  Ok(SectionRecord {
    section_id:  encode::decode_uuid(&section_id)?,
    cover_id:    encode::decode_uuid(&cover_id)?,
    recorded_at: encode::decode_dt(&recorded_at)?,
    data:        serde_json::from_str(&json)?,
  })
}

fn section_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSection> {
  Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

// ─── InterviewStore impl ─────────────────────────────────────────────────────

impl InterviewStore for SqliteStore {
  type Error = Error;

  // ── Covers ────────────────────────────────────────────────────────────────

  async fn create_cover(&self, cover: Cover) -> Result<Cover> {
    let raw = encode::cover_to_raw(&cover);
    self
      .conn
      .call(move |conn| {
        encode::insert_cover(conn, &raw)?;
        Ok(())
      })
      .await?;
    Ok(cover)
  }

  async fn get_cover(&self, cover_id: Uuid) -> Result<Option<Cover>> {
    let id_str = encode_uuid(cover_id);
    let raw = self
      .conn
      .call(move |conn| Ok(read_raw_cover(conn, &id_str)?))
      .await?;
    raw.map(RawCover::into_cover).transpose()
  }

  async fn list_covers(&self) -> Result<Vec<Cover>> {
    let raws: Vec<RawCover> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COVER_COLUMNS} FROM covers ORDER BY created_at, cover_id"
        ))?;
        let rows = stmt
          .query_map([], |row| RawCover::from_row(row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawCover::into_cover).collect()
  }

  async fn update_cover(
    &self,
    cover_id: Uuid,
    patch: CoverPatch,
  ) -> Result<Option<Cover>> {
    let id_str = encode_uuid(cover_id);
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(mut raw) = read_raw_cover(&tx, &id_str)? else {
          return Ok(None);
        };
        raw.apply_patch(&patch);
        encode::update_cover_row(&tx, &raw)?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;
    raw.map(RawCover::into_cover).transpose()
  }

  async fn delete_cover(&self, cover_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(cover_id);
    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM covers WHERE cover_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(n > 0)
      })
      .await?;
    Ok(deleted)
  }

  // ── Sections ──────────────────────────────────────────────────────────────

  async fn insert_section<T: SectionData>(
    &self,
    cover_id: Uuid,
    data: T,
  ) -> Result<SectionRecord<T>> {
    let record = SectionRecord {
      section_id: Uuid::new_v4(),
      cover_id,
      recorded_at: Utc::now(),
      data,
    };
    let section_id = encode_uuid(record.section_id);
    let cover_id_str = encode_uuid(cover_id);
    let recorded_at = encode_dt(record.recorded_at);
    let json = serde_json::to_string(&record.data)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO {} (section_id, cover_id, data, recorded_at)
             VALUES (?1, ?2, ?3, ?4)",
            T::KEY
          ),
          rusqlite::params![section_id, cover_id_str, json, recorded_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(record)
  }

  async fn get_section<T: SectionData>(
    &self,
    section_id: Uuid,
  ) -> Result<Option<SectionRecord<T>>> {
    let id_str = encode_uuid(section_id);
    let raw: Option<RawSection> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!(
              "SELECT section_id, cover_id, data, recorded_at
               FROM {} WHERE section_id = ?1",
              T::KEY
            ),
            rusqlite::params![id_str],
            section_from_row,
          )
          .optional()?;
        Ok(raw)
      })
      .await?;
    raw.map(decode_section).transpose()
  }

  async fn section_for_cover<T: SectionData>(
    &self,
    cover_id: Uuid,
  ) -> Result<Option<SectionRecord<T>>> {
    let id_str = encode_uuid(cover_id);
    let raw: Option<RawSection> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!(
              "SELECT section_id, cover_id, data, recorded_at
               FROM {} WHERE cover_id = ?1",
              T::KEY
            ),
            rusqlite::params![id_str],
            section_from_row,
          )
          .optional()?;
        Ok(raw)
      })
      .await?;
    raw.map(decode_section).transpose()
  }

  async fn list_sections<T: SectionData>(
    &self,
  ) -> Result<Vec<SectionRecord<T>>> {
    let raws: Vec<RawSection> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT section_id, cover_id, data, recorded_at
           FROM {} ORDER BY recorded_at, section_id",
          T::KEY
        ))?;
        let rows = stmt
          .query_map([], section_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(decode_section).collect()
  }

  async fn update_section<T: SectionData>(
    &self,
    section_id: Uuid,
    data: T,
  ) -> Result<Option<SectionRecord<T>>> {
    let id_str = encode_uuid(section_id);
    let recorded_at = Utc::now();
    let recorded_at_str = encode_dt(recorded_at);
    let json = serde_json::to_string(&data)?;

    let cover_id: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let cover_id: Option<String> = tx
          .query_row(
            &format!(
              "SELECT cover_id FROM {} WHERE section_id = ?1",
              T::KEY
            ),
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?;
        let Some(cover_id) = cover_id else {
          return Ok(None);
        };
        tx.execute(
          &format!(
            "UPDATE {} SET data = ?2, recorded_at = ?3
             WHERE section_id = ?1",
            T::KEY
          ),
          rusqlite::params![id_str, json, recorded_at_str],
        )?;
        tx.commit()?;
        Ok(Some(cover_id))
      })
      .await?;

    match cover_id {
      None => Ok(None),
      Some(cover_id) => Ok(Some(SectionRecord {
        section_id,
        cover_id: encode::decode_uuid(&cover_id)?,
        recorded_at,
        data,
      })),
    }
  }

  async fn delete_section<T: SectionData>(
    &self,
    section_id: Uuid,
  ) -> Result<bool> {
    let id_str = encode_uuid(section_id);
    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          &format!("DELETE FROM {} WHERE section_id = ?1", T::KEY),
          rusqlite::params![id_str],
        )?;
        Ok(n > 0)
      })
      .await?;
    Ok(deleted)
  }

  // ── Nested interview operations ───────────────────────────────────────────

  async fn get_interview(
    &self,
    cover_id: Uuid,
  ) -> Result<Option<Interview>> {
    let id_str = encode_uuid(cover_id);
    let raw = self
      .conn
      .call(move |conn| {
        let Some(raw_cover) = read_raw_cover(conn, &id_str)? else {
          return Ok(None);
        };
        let raw_sections = read_raw_sections(conn, &id_str)?;
        Ok(Some((raw_cover, raw_sections)))
      })
      .await?;

    match raw {
      None => Ok(None),
      Some((raw_cover, raw_sections)) => Ok(Some(Interview {
        cover:    raw_cover.into_cover()?,
        sections: decode_sections(raw_sections)?,
      })),
    }
  }

  async fn create_interview(
    &self,
    cover: Cover,
    sections: Sections,
  ) -> Result<Interview> {
    let raw = encode::cover_to_raw(&cover);
    let now = encode_dt(Utc::now());
    let rows = section_rows(&sections)?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        encode::insert_cover(&tx, &raw)?;
        for (key, section_id, json) in &rows {
          tx.execute(
            &format!(
              "INSERT INTO {key} (section_id, cover_id, data, recorded_at)
               VALUES (?1, ?2, ?3, ?4)"
            ),
            rusqlite::params![section_id, raw.cover_id, json, now],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(Interview { cover, sections })
  }

  async fn update_interview(
    &self,
    cover_id: Uuid,
    patch: CoverPatch,
    sections: Sections,
  ) -> Result<Option<Interview>> {
    let id_str = encode_uuid(cover_id);
    let now = encode_dt(Utc::now());
    let upserts = section_rows(&sections)?;

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(mut raw) = read_raw_cover(&tx, &id_str)? else {
          return Ok(None);
        };
        raw.apply_patch(&patch);
        encode::update_cover_row(&tx, &raw)?;
        for (key, section_id, json) in &upserts {
          tx.execute(
            &format!(
              "INSERT INTO {key} (section_id, cover_id, data, recorded_at)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(cover_id) DO UPDATE
               SET data = excluded.data, recorded_at = excluded.recorded_at"
            ),
            rusqlite::params![section_id, raw.cover_id, json, now],
          )?;
        }
        let raw_sections = read_raw_sections(&tx, &raw.cover_id)?;
        tx.commit()?;
        Ok(Some((raw, raw_sections)))
      })
      .await?;

    match raw {
      None => Ok(None),
      Some((raw_cover, raw_sections)) => Ok(Some(Interview {
        cover:    raw_cover.into_cover()?,
        sections: decode_sections(raw_sections)?,
      })),
    }
  }
}

// ─── AuthStore impl ──────────────────────────────────────────────────────────

impl AuthStore for SqliteStore {
  type Error = Error;

  async fn create_user(
    &self,
    username: String,
    email: Option<String>,
    password_hash: String,
  ) -> Result<User> {
    let user = User {
      user_id: Uuid::new_v4(),
      username,
      email,
      created_at: Utc::now(),
    };
    let id_str = encode_uuid(user.user_id);
    let at_str = encode_dt(user.created_at);
    let username = user.username.clone();
    let email = user.email.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, username, email, password_hash,
             created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, username, email, password_hash, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(user)
  }

  async fn user_with_password(
    &self,
    username: &str,
  ) -> Result<Option<(User, String)>> {
    let username = username.to_string();
    let raw: Option<(RawUser, String)> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT user_id, username, email, created_at, password_hash
             FROM users WHERE username = ?1",
            rusqlite::params![username],
            |row| Ok((RawUser::from_row(row)?, row.get(4)?)),
          )
          .optional()?;
        Ok(raw)
      })
      .await?;

    match raw {
      None => Ok(None),
      Some((raw_user, hash)) => Ok(Some((raw_user.into_user()?, hash))),
    }
  }

  async fn insert_token(&self, token: String, user_id: Uuid) -> Result<()> {
    let user_id_str = encode_uuid(user_id);
    let at_str = encode_dt(Utc::now());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO tokens (token, user_id, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![token, user_id_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_token(&self, token: &str) -> Result<bool> {
    let token = token.to_string();
    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM tokens WHERE token = ?1",
          rusqlite::params![token],
        )?;
        Ok(n > 0)
      })
      .await?;
    Ok(deleted)
  }

  async fn user_for_token(&self, token: &str) -> Result<Option<User>> {
    let token = token.to_string();
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT u.user_id, u.username, u.email, u.created_at
             FROM tokens t JOIN users u ON u.user_id = t.user_id
             WHERE t.token = ?1",
            rusqlite::params![token],
            |row| RawUser::from_row(row),
          )
          .optional()?;
        Ok(raw)
      })
      .await?;
    raw.map(RawUser::into_user).transpose()
  }
}
