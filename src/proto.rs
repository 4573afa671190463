//! The on-the-wire record shape carried inside [`crate::wire`] frames.
//!
//! A small explicit binary encoding rather than a schema-compiler-generated
//! one, built on the same `byteorder` primitives the framing layer uses, so
//! the whole wire stack shares one dependency for integer and float
//! encoding.

use crate::error::Error;
use crate::person::{GeoPosition, Person, PersonId};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use chrono::NaiveDate;
use std::io::{Cursor, Read, Write};
use uuid::Uuid;

/// A find request: search near `(latitude, longitude)` for people near
/// `age` years old.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Request {
    pub latitude: f64,
    pub longitude: f64,
    pub age: i32,
}

impl Request {
    pub fn encode(&self, out: &mut impl Write) -> Result<(), Error> {
        out.write_f64::<BigEndian>(self.latitude)?;
        out.write_f64::<BigEndian>(self.longitude)?;
        out.write_i32::<BigEndian>(self.age)?;
        Ok(())
    }

    pub fn decode(body: &[u8]) -> Result<Self, Error> {
        let mut cursor = Cursor::new(body);
        let latitude = read_f64(&mut cursor)?;
        let longitude = read_f64(&mut cursor)?;
        let age = read_i32(&mut cursor)?;
        Ok(Request { latitude, longitude, age })
    }
}

/// One person as it appears on the wire: `id` (16 bytes), `name`
/// (length-prefixed UTF-8), `date_of_birth` (i32 days since the Unix
/// epoch), then `latitude`/`longitude` (f64 each).
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRecord {
    pub id: Uuid,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
}

impl PersonRecord {
    pub fn from_person(person: &Person) -> Self {
        PersonRecord {
            id: person.id().as_uuid(),
            name: person.name().to_owned(),
            date_of_birth: person.date_of_birth(),
            latitude: person.home().latitude(),
            longitude: person.home().longitude(),
        }
    }

    pub fn into_person(self) -> Result<Person, Error> {
        let home = GeoPosition::new(self.latitude, self.longitude)?;
        Ok(Person::new(PersonId::new(self.id), self.name, self.date_of_birth, home))
    }

    fn encode(&self, out: &mut impl Write) -> Result<(), Error> {
        out.write_all(self.id.as_bytes())?;
        let name_bytes = self.name.as_bytes();
        let name_len = u16::try_from(name_bytes.len())
            .map_err(|_| Error::Programmer(format!("person name too long to encode ({} bytes)", name_bytes.len())))?;
        out.write_u16::<BigEndian>(name_len)?;
        out.write_all(name_bytes)?;
        out.write_i32::<BigEndian>(days_since_epoch(self.date_of_birth))?;
        out.write_f64::<BigEndian>(self.latitude)?;
        out.write_f64::<BigEndian>(self.longitude)?;
        Ok(())
    }

    fn decode(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        let mut id_bytes = [0u8; 16];
        cursor
            .read_exact(&mut id_bytes)
            .map_err(|_| Error::Protocol("truncated person record: missing id".into()))?;
        let id = Uuid::from_bytes(id_bytes);

        let name_len = read_u16(cursor)? as usize;
        let mut name_bytes = vec![0u8; name_len];
        cursor
            .read_exact(&mut name_bytes)
            .map_err(|_| Error::Protocol("truncated person record: missing name bytes".into()))?;
        let name = String::from_utf8(name_bytes)
            .map_err(|_| Error::Protocol("person record name is not valid UTF-8".into()))?;

        let days = read_i32(cursor)?;
        let date_of_birth = date_from_epoch_days(days)
            .ok_or_else(|| Error::Protocol(format!("person record date_of_birth {days} is out of range")))?;

        let latitude = read_f64(cursor)?;
        let longitude = read_f64(cursor)?;

        Ok(PersonRecord { id, name, date_of_birth, latitude, longitude })
    }
}

/// A find response: a count-prefixed list of matching person records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Response {
    pub people: Vec<PersonRecord>,
}

impl Response {
    pub fn encode(&self, out: &mut impl Write) -> Result<(), Error> {
        let count = u32::try_from(self.people.len())
            .map_err(|_| Error::Programmer(format!("response has too many records to encode ({})", self.people.len())))?;
        out.write_u32::<BigEndian>(count)?;
        for record in &self.people {
            record.encode(out)?;
        }
        Ok(())
    }

    pub fn decode(body: &[u8]) -> Result<Self, Error> {
        let mut cursor = Cursor::new(body);
        let count = read_u32(&mut cursor)?;
        let mut people = Vec::with_capacity(count as usize);
        for _ in 0..count {
            people.push(PersonRecord::decode(&mut cursor)?);
        }
        Ok(Response { people })
    }
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    (date - epoch).num_days() as i32
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    epoch.checked_add_signed(chrono::Duration::days(days as i64))
}

fn read_f64(cursor: &mut Cursor<&[u8]>) -> Result<f64, Error> {
    cursor
        .read_f64::<BigEndian>()
        .map_err(|_| Error::Protocol("truncated record: expected an 8-byte float".into()))
}

fn read_i32(cursor: &mut Cursor<&[u8]>) -> Result<i32, Error> {
    cursor
        .read_i32::<BigEndian>()
        .map_err(|_| Error::Protocol("truncated record: expected a 4-byte integer".into()))
}

fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32, Error> {
    cursor
        .read_u32::<BigEndian>()
        .map_err(|_| Error::Protocol("truncated record: expected a 4-byte count".into()))
}

fn read_u16(cursor: &mut Cursor<&[u8]>) -> Result<u16, Error> {
    cursor
        .read_u16::<BigEndian>()
        .map_err(|_| Error::Protocol("truncated record: expected a 2-byte length".into()))
}
