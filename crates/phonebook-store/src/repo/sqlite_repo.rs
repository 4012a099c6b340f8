//! SQLite contact repository
//!
//! Every mutation runs on the single writer connection inside an IMMEDIATE
//! transaction so the uniqueness checks and the write cannot interleave with
//! another writer. The unique index on `phone_number` backs this up for
//! writers outside this process. Queries run on pooled reader connections
//! and never wait for each other; queries made of more than one statement
//! run inside a read transaction.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use phonebook_core::errors::{PhonebookError, Result};
use phonebook_core::model::now_millis;
use phonebook_core::queries::search::fold;
use phonebook_core::queries::{build_statistics, normalize_keyword, Page, PageRequest};
use phonebook_core::rules::validate_contact_input;
use phonebook_core::{Contact, ContactId, ContactInput, ContactStore};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use crate::db::DbTarget;
use crate::errors::{from_rusqlite, is_constraint_violation};
use crate::migrations::apply_migrations;
use crate::pool::{PooledConnection, ReadPool};

const COLUMNS: &str =
    "id, name, phone_number, email, address, category, notes, created_at, updated_at";

/// Shared WHERE clause for keyword search; ?1 is the folded keyword, ?2 the raw one
const SEARCH_PREDICATE: &str = "instr(phonebook_lower(name), ?1) > 0
     OR instr(phone_number, ?2) > 0
     OR (email IS NOT NULL AND instr(phonebook_lower(email), ?1) > 0)";

/// Durable contact store: one writer connection plus a pool of readers
pub struct SqliteContactStore {
    writer: Mutex<Connection>,
    readers: ReadPool,
}

impl SqliteContactStore {
    /// Open (or create) the database file at `path` and bring its schema up to date
    ///
    /// # Errors
    /// Fails if the file cannot be opened or a migration fails.
    pub fn open<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        Self::open_target(DbTarget::file(path))
    }

    /// A fresh, private in-memory database
    ///
    /// # Errors
    /// Fails if SQLite cannot be initialized.
    pub fn open_in_memory() -> crate::Result<Self> {
        Self::open_target(DbTarget::shared_memory())
    }

    /// Open the writer for `target`, apply pending migrations, and serve
    /// queries from reader connections to the same database
    ///
    /// # Errors
    /// Fails if a migration fails or a recorded checksum does not match.
    pub fn open_target(target: DbTarget) -> crate::Result<Self> {
        let mut conn = target.open_writer()?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            writer: Mutex::new(conn),
            readers: ReadPool::new(target),
        })
    }

    fn reader(&self) -> Result<PooledConnection<'_>> {
        Ok(self.readers.get()?)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        name: row.get(1)?,
        phone_number: row.get(2)?,
        email: row.get(3)?,
        address: row.get(4)?,
        category: row.get(5)?,
        notes: row.get(6)?,
        created_at: millis_to_datetime(row.get(7)?, 7)?,
        updated_at: millis_to_datetime(row.get(8)?, 8)?,
    })
}

fn millis_to_datetime(millis: i64, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, millis))
}

/// LIMIT/OFFSET for a page request; SQLite treats a negative LIMIT as "no limit"
fn limit_offset(request: &PageRequest) -> (i64, i64) {
    match request {
        PageRequest::Unpaged => (-1, 0),
        PageRequest::Paged { size, .. } => (
            i64::try_from(*size).unwrap_or(i64::MAX),
            i64::try_from(request.offset()).unwrap_or(i64::MAX),
        ),
    }
}

fn query_contacts<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Contact>> {
    let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
    let contacts = stmt
        .query_map(params, map_row)
        .map_err(from_rusqlite)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(from_rusqlite)?;
    Ok(contacts)
}

fn count_where<P: rusqlite::Params>(conn: &Connection, predicate: &str, params: P) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM contacts WHERE {}", predicate);
    let count: i64 = conn
        .query_row(&sql, params, |row| row.get(0))
        .map_err(from_rusqlite)?;
    Ok(count.max(0) as u64)
}

fn fetch_by_id(conn: &Connection, id: ContactId) -> Result<Option<Contact>> {
    let sql = format!("SELECT {} FROM contacts WHERE id = ?1", COLUMNS);
    conn.query_row(&sql, [id], map_row)
        .optional()
        .map_err(|e| from_rusqlite(e).into())
}

fn phone_exists(conn: &Connection, phone_number: &str, exclude_id: Option<ContactId>) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM contacts WHERE phone_number = ?1 AND (?2 IS NULL OR id <> ?2))",
        params![phone_number, exclude_id],
        |row| row.get(0),
    )
    .map_err(|e| from_rusqlite(e).into())
}

fn email_exists(conn: &Connection, email: &str, exclude_id: Option<ContactId>) -> Result<bool> {
    if email.trim().is_empty() {
        return Ok(false);
    }
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM contacts WHERE email = ?1 AND (?2 IS NULL OR id <> ?2))",
        params![email, exclude_id],
        |row| row.get(0),
    )
    .map_err(|e| from_rusqlite(e).into())
}

/// Turn a failed INSERT/UPDATE into the domain error it stands for
fn write_error(err: rusqlite::Error, phone_number: &str) -> PhonebookError {
    if is_constraint_violation(&err) {
        PhonebookError::DuplicatePhoneNumber {
            phone_number: phone_number.to_string(),
        }
    } else {
        from_rusqlite(err).into()
    }
}

impl ContactStore for SqliteContactStore {
    fn create(&self, input: ContactInput) -> Result<Contact> {
        validate_contact_input(&input)?;

        let mut conn = self.writer.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;

        if phone_exists(&tx, &input.phone_number, None)? {
            return Err(PhonebookError::DuplicatePhoneNumber {
                phone_number: input.phone_number,
            });
        }
        if let Some(email) = input.effective_email() {
            if email_exists(&tx, email, None)? {
                return Err(PhonebookError::DuplicateEmail {
                    email: email.to_string(),
                });
            }
        }

        let mut contact = Contact::from_input(0, input, now_millis());
        tx.execute(
            "INSERT INTO contacts (name, phone_number, email, address, category, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                contact.name,
                contact.phone_number,
                contact.email,
                contact.address,
                contact.category,
                contact.notes,
                contact.created_at.timestamp_millis(),
                contact.updated_at.timestamp_millis(),
            ],
        )
        .map_err(|e| write_error(e, &contact.phone_number))?;
        contact.id = tx.last_insert_rowid();

        tx.commit().map_err(from_rusqlite)?;
        Ok(contact)
    }

    fn get_by_id(&self, id: ContactId) -> Result<Option<Contact>> {
        fetch_by_id(&*self.reader()?, id)
    }

    fn list(&self, request: &PageRequest) -> Result<Page<Contact>> {
        let reader = self.reader()?;
        let conn = reader.unchecked_transaction().map_err(from_rusqlite)?;
        let (limit, offset) = limit_offset(request);
        let order = match request.sort() {
            Some(sort) => format!("{} {}, id ASC", sort.field.column(), sort.direction.as_sql()),
            None => "id ASC".to_string(),
        };
        let sql = format!(
            "SELECT {} FROM contacts ORDER BY {} LIMIT ?1 OFFSET ?2",
            COLUMNS, order
        );

        let content = query_contacts(&conn, &sql, params![limit, offset])?;
        let total = count_where(&conn, "1", [])?;
        Ok(Page::new(content, request, total))
    }

    fn update(&self, id: ContactId, input: ContactInput) -> Result<Contact> {
        validate_contact_input(&input)?;

        let mut conn = self.writer.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;

        let mut contact = fetch_by_id(&tx, id)?.ok_or(PhonebookError::NotFound { id })?;

        if contact.phone_number != input.phone_number
            && phone_exists(&tx, &input.phone_number, Some(id))?
        {
            return Err(PhonebookError::DuplicatePhoneNumber {
                phone_number: input.phone_number,
            });
        }
        if let Some(email) = input.effective_email() {
            if contact.email.as_deref() != Some(email) && email_exists(&tx, email, Some(id))? {
                return Err(PhonebookError::DuplicateEmail {
                    email: email.to_string(),
                });
            }
        }

        contact.apply_input(input, now_millis());
        tx.execute(
            "UPDATE contacts
             SET name = ?1, phone_number = ?2, email = ?3, address = ?4,
                 category = ?5, notes = ?6, updated_at = ?7
             WHERE id = ?8",
            params![
                contact.name,
                contact.phone_number,
                contact.email,
                contact.address,
                contact.category,
                contact.notes,
                contact.updated_at.timestamp_millis(),
                id,
            ],
        )
        .map_err(|e| write_error(e, &contact.phone_number))?;

        tx.commit().map_err(from_rusqlite)?;
        Ok(contact)
    }

    fn delete(&self, id: ContactId) -> Result<()> {
        let removed = self
            .writer
            .lock()
            .execute("DELETE FROM contacts WHERE id = ?1", [id])
            .map_err(from_rusqlite)?;
        if removed == 0 {
            return Err(PhonebookError::NotFound { id });
        }
        Ok(())
    }

    fn delete_batch(&self, ids: &[ContactId]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.writer.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;
        let mut removed = 0u64;
        {
            let mut stmt = tx
                .prepare("DELETE FROM contacts WHERE id = ?1")
                .map_err(from_rusqlite)?;
            for id in ids {
                removed += stmt.execute([id]).map_err(from_rusqlite)? as u64;
            }
        }
        tx.commit().map_err(from_rusqlite)?;
        Ok(removed)
    }

    fn search(&self, keyword: &str, request: &PageRequest) -> Result<Page<Contact>> {
        let Some(keyword) = normalize_keyword(keyword) else {
            return self.list(request);
        };
        let folded = fold(keyword);

        let reader = self.reader()?;
        let conn = reader.unchecked_transaction().map_err(from_rusqlite)?;
        let (limit, offset) = limit_offset(request);
        let sql = format!(
            "SELECT {} FROM contacts
             WHERE {}
             ORDER BY CASE
                 WHEN instr(phonebook_lower(name), ?1) = 1 THEN 1
                 WHEN instr(phone_number, ?2) = 1 THEN 2
                 ELSE 3
             END, name ASC, id ASC
             LIMIT ?3 OFFSET ?4",
            COLUMNS, SEARCH_PREDICATE
        );

        let content = query_contacts(&conn, &sql, params![folded, keyword, limit, offset])?;
        let total = count_where(&conn, SEARCH_PREDICATE, params![folded, keyword])?;
        Ok(Page::new(content, request, total))
    }

    fn list_by_category(&self, category: &str, request: &PageRequest) -> Result<Page<Contact>> {
        let reader = self.reader()?;
        let conn = reader.unchecked_transaction().map_err(from_rusqlite)?;
        let (limit, offset) = limit_offset(request);
        let sql = format!(
            "SELECT {} FROM contacts WHERE category = ?1
             ORDER BY name ASC, id ASC LIMIT ?2 OFFSET ?3",
            COLUMNS
        );

        let content = query_contacts(&conn, &sql, params![category, limit, offset])?;
        let total = count_where(&conn, "category = ?1", [category])?;
        Ok(Page::new(content, request, total))
    }

    fn exists_by_phone_number(
        &self,
        phone_number: &str,
        exclude_id: Option<ContactId>,
    ) -> Result<bool> {
        phone_exists(&*self.reader()?, phone_number, exclude_id)
    }

    fn exists_by_email(&self, email: &str, exclude_id: Option<ContactId>) -> Result<bool> {
        email_exists(&*self.reader()?, email, exclude_id)
    }

    fn statistics(&self) -> Result<BTreeMap<String, u64>> {
        let reader = self.reader()?;
        let conn = reader.unchecked_transaction().map_err(from_rusqlite)?;
        let total = count_where(&conn, "1", [])?;

        let mut stmt = conn
            .prepare("SELECT category, COUNT(*) FROM contacts GROUP BY category")
            .map_err(from_rusqlite)?;
        let per_category = stmt
            .query_map([], |row| {
                let count: i64 = row.get(1)?;
                Ok((row.get::<_, String>(0)?, count.max(0) as u64))
            })
            .map_err(from_rusqlite)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(from_rusqlite)?;

        Ok(build_statistics(total, per_category))
    }

    fn find_by_phone_number(&self, phone_number: &str) -> Result<Option<Contact>> {
        let sql = format!("SELECT {} FROM contacts WHERE phone_number = ?1", COLUMNS);
        self.reader()?
            .query_row(&sql, [phone_number], map_row)
            .optional()
            .map_err(|e| from_rusqlite(e).into())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Contact>> {
        if email.trim().is_empty() {
            return Ok(None);
        }
        let sql = format!(
            "SELECT {} FROM contacts WHERE email = ?1 ORDER BY id LIMIT 1",
            COLUMNS
        );
        self.reader()?
            .query_row(&sql, [email], map_row)
            .optional()
            .map_err(|e| from_rusqlite(e).into())
    }

    fn recent(&self, limit: usize) -> Result<Vec<Contact>> {
        let sql = format!(
            "SELECT {} FROM contacts ORDER BY created_at DESC, id DESC LIMIT ?1",
            COLUMNS
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        query_contacts(&*self.reader()?, &sql, [limit])
    }

    fn count(&self) -> Result<u64> {
        count_where(&*self.reader()?, "1", [])
    }
}
