use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::models::{Course, Module, NewCourseRequest};

#[derive(Debug, FromRow)]
struct ModuleRow {
    object_id: String,
    document: String,
}

fn decode(row: ModuleRow) -> Result<Module, sqlx::Error> {
    let mut module: Module =
        serde_json::from_str(&row.document).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    module.object_id = Some(row.object_id);
    Ok(module)
}

fn encode(module: &Module) -> Result<String, sqlx::Error> {
    serde_json::to_string(module).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

/// Gives every lesson and every block without a persistent id a fresh one.
fn assign_identifiers(module: &mut Module) {
    for sub in &mut module.sub_modules {
        if sub.object_id.as_deref().is_none_or(str::is_empty) {
            sub.object_id = Some(Uuid::new_v4().to_string());
        }
        for block in &mut sub.content_blocks {
            if block.is_temporary() {
                block.id = Some(Uuid::new_v4().to_string());
            }
        }
    }
}

pub async fn fetch_modules(
    db: &SqlitePool,
    course_id: &str,
    published_only: bool,
) -> Result<Vec<Module>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ModuleRow>(
        r#"
        SELECT object_id, document
        FROM modules
        WHERE course_id = ?1
          AND (?2 = 0 OR is_published = 1)
        ORDER BY sort_order, id
        "#,
    )
    .bind(course_id)
    .bind(published_only)
    .fetch_all(db)
    .await?;

    rows.into_iter()
        .map(|row| {
            let module = decode(row)?;
            Ok(if published_only {
                module.published_view()
            } else {
                module
            })
        })
        .collect()
}

pub async fn find_module(db: &SqlitePool, object_id: &str) -> Result<Option<Module>, sqlx::Error> {
    sqlx::query_as::<_, ModuleRow>("SELECT object_id, document FROM modules WHERE object_id = ?1")
        .bind(object_id)
        .fetch_optional(db)
        .await?
        .map(decode)
        .transpose()
}

pub async fn insert_module(db: &SqlitePool, mut module: Module) -> Result<Module, sqlx::Error> {
    let object_id = Uuid::new_v4().to_string();
    module.object_id = Some(object_id.clone());
    module.updated_at = Some(Utc::now());
    assign_identifiers(&mut module);
    let document = encode(&module)?;

    sqlx::query(
        r#"
        INSERT INTO modules
            (object_id, course_id, id, sort_order, is_published, document, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&object_id)
    .bind(&module.course_id)
    .bind(&module.id)
    .bind(module.order)
    .bind(module.is_published)
    .bind(&document)
    .bind(Utc::now().to_rfc3339())
    .execute(db)
    .await?;

    Ok(module)
}

/// Replaces the whole stored document. No version check: the last
/// write wins.
pub async fn update_module(
    db: &SqlitePool,
    object_id: &str,
    mut module: Module,
) -> Result<Option<Module>, sqlx::Error> {
    module.object_id = Some(object_id.to_string());
    module.updated_at = Some(Utc::now());
    assign_identifiers(&mut module);
    let document = encode(&module)?;

    let result = sqlx::query(
        r#"
        UPDATE modules
        SET course_id = ?2,
            id = ?3,
            sort_order = ?4,
            is_published = ?5,
            document = ?6,
            updated_at = ?7
        WHERE object_id = ?1
        "#,
    )
    .bind(object_id)
    .bind(&module.course_id)
    .bind(&module.id)
    .bind(module.order)
    .bind(module.is_published)
    .bind(&document)
    .bind(Utc::now().to_rfc3339())
    .execute(db)
    .await?;

    Ok((result.rows_affected() > 0).then_some(module))
}

pub async fn delete_module(db: &SqlitePool, object_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM modules WHERE object_id = ?1")
        .bind(object_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

const COURSE_COLUMNS: &str = r#"
    SELECT
        c.object_id, c.id, c.title, c.description, c.category, c.duration, c.price,
        (SELECT COUNT(*) FROM modules m
         WHERE m.course_id = c.id AND m.is_published = 1) AS published_modules
    FROM courses c
"#;

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("{COURSE_COLUMNS} ORDER BY c.created_at, c.id"))
        .fetch_all(db)
        .await
}

pub async fn find_course(db: &SqlitePool, id: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("{COURSE_COLUMNS} WHERE c.id = ?1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_course(db: &SqlitePool, req: NewCourseRequest) -> Result<Course, sqlx::Error> {
    let object_id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO courses
            (object_id, id, title, description, category, duration, price, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&object_id)
    .bind(&req.id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.category)
    .bind(&req.duration)
    .bind(req.price)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Course {
        object_id,
        id: req.id,
        title: req.title,
        description: req.description,
        category: req.category,
        duration: req.duration,
        price: req.price,
        published_modules: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::models::SubModule;
    use serde_json::json;

    fn module(id: &str, published: bool) -> Module {
        let mut module = Module::new("java", id, id.to_uppercase(), 1);
        module.is_published = published;
        let mut sub = SubModule::new("intro", "Intro", 1);
        sub.content_blocks = serde_json::from_value(json!([
            { "_id": "temp-1", "type": "text", "order": 1, "content": { "text": "hi" } }
        ]))
        .unwrap();
        module.sub_modules.push(sub);
        module
    }

    #[tokio::test]
    async fn insert_assigns_persistent_ids() {
        let db = connect_in_memory().await.unwrap();
        let saved = insert_module(&db, module("basics", true)).await.unwrap();

        assert!(saved.object_id.is_some());
        let block = &saved.sub_modules[0].content_blocks[0];
        assert!(!block.is_temporary());

        let found = find_module(&db, saved.object_id.as_deref().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, saved);
    }

    #[tokio::test]
    async fn published_listing_hides_drafts() {
        let db = connect_in_memory().await.unwrap();
        insert_module(&db, module("basics", true)).await.unwrap();
        insert_module(&db, module("draft", false)).await.unwrap();

        assert_eq!(fetch_modules(&db, "java", false).await.unwrap().len(), 2);
        let published = fetch_modules(&db, "java", true).await.unwrap();
        assert_eq!(published.len(), 1);
        // The lesson itself is unpublished.
        assert!(published[0].sub_modules.is_empty());
    }

    #[tokio::test]
    async fn course_counts_published_modules() {
        let db = connect_in_memory().await.unwrap();
        insert_course(
            &db,
            NewCourseRequest {
                id: "java".to_string(),
                title: "Java".to_string(),
                description: String::new(),
                category: "programming".to_string(),
                duration: "8 weeks".to_string(),
                price: 0.0,
            },
        )
        .await
        .unwrap();
        insert_module(&db, module("basics", true)).await.unwrap();
        insert_module(&db, module("draft", false)).await.unwrap();

        let course = find_course(&db, "java").await.unwrap().unwrap();
        assert_eq!(course.published_modules, 1);
        assert_eq!(fetch_courses(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_ids() {
        let db = connect_in_memory().await.unwrap();
        assert_eq!(update_module(&db, "missing", module("x", true)).await.unwrap(), None);
        assert!(!delete_module(&db, "missing").await.unwrap());
    }
}
