use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use thiserror::Error;

use crate::database::Database;

const COLUMNS: &str = "id, name, map_url, img_url, location, seats, \
    has_toilet, has_wifi, has_sockets, can_take_calls, coffee_price";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a cafe named {0:?} already exists")]
    DuplicateName(String),

    #[error("cafe {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Cafe {
    pub id: i64,
    pub name: String,
    pub map_url: String,
    pub img_url: String,
    pub location: String,
    pub seats: String,
    pub has_toilet: String,
    pub has_wifi: String,
    pub has_sockets: String,
    pub can_take_calls: String,
    pub coffee_price: Option<String>,
}

/// Validated fields for a cafe that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCafe {
    pub name: String,
    pub map_url: String,
    pub img_url: String,
    pub location: String,
    pub seats: String,
    pub has_toilet: String,
    pub has_wifi: String,
    pub has_sockets: String,
    pub can_take_calls: String,
    pub coffee_price: Option<String>,
}

fn classify_insert_error(err: sqlx::Error, name: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateName(name.to_string());
        }
    }
    StoreError::Database(err)
}

impl Cafe {
    pub async fn list_all(db: &Database) -> Result<Vec<Cafe>, StoreError> {
        let cafes = sqlx::query_as::<_, Cafe>(&format!("SELECT {COLUMNS} FROM cafe ORDER BY id"))
            .fetch_all(&db.pool)
            .await?;
        Ok(cafes)
    }

    pub async fn find_by_id(id: i64, db: &Database) -> Result<Option<Cafe>, StoreError> {
        let cafe = sqlx::query_as::<_, Cafe>(&format!("SELECT {COLUMNS} FROM cafe WHERE id = ?"))
            .bind(id)
            .fetch_optional(&db.pool)
            .await?;
        Ok(cafe)
    }

    pub async fn count(db: &Database) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cafe")
            .fetch_one(&db.pool)
            .await?;
        Ok(count)
    }

    // Уникальность имени проверяет сама БД (UNIQUE), без предварительного SELECT
    pub async fn insert(new: &NewCafe, db: &Database) -> Result<Cafe, StoreError> {
        sqlx::query_as::<_, Cafe>(&format!(
            "INSERT INTO cafe (name, map_url, img_url, location, seats, \
             has_toilet, has_wifi, has_sockets, can_take_calls, coffee_price) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.map_url)
        .bind(&new.img_url)
        .bind(&new.location)
        .bind(&new.seats)
        .bind(&new.has_toilet)
        .bind(&new.has_wifi)
        .bind(&new.has_sockets)
        .bind(&new.can_take_calls)
        .bind(&new.coffee_price)
        .fetch_one(&db.pool)
        .await
        .map_err(|e| classify_insert_error(e, &new.name))
    }

    pub async fn delete_by_id(id: i64, db: &Database) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM cafe WHERE id = ?")
            .bind(id)
            .execute(&db.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    /// Flat column-name -> value mapping used by the JSON listing.
    pub fn to_public_dict(&self) -> Map<String, Value> {
        let mut dict = Map::new();
        dict.insert("id".into(), Value::from(self.id));
        dict.insert("name".into(), Value::from(self.name.clone()));
        dict.insert("map_url".into(), Value::from(self.map_url.clone()));
        dict.insert("img_url".into(), Value::from(self.img_url.clone()));
        dict.insert("location".into(), Value::from(self.location.clone()));
        dict.insert("seats".into(), Value::from(self.seats.clone()));
        dict.insert("has_toilet".into(), Value::from(self.has_toilet.clone()));
        dict.insert("has_wifi".into(), Value::from(self.has_wifi.clone()));
        dict.insert("has_sockets".into(), Value::from(self.has_sockets.clone()));
        dict.insert("can_take_calls".into(), Value::from(self.can_take_calls.clone()));
        dict.insert(
            "coffee_price".into(),
            self.coffee_price.clone().map_or(Value::Null, Value::from),
        );
        dict
    }
}
