//! In-memory course store loaded from a JSON catalog file

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{CatalogEntry, ChunkMetadata, LessonEntry, SearchResults, VectorStore};
use crate::error::Result;

/// Default number of chunks returned per search
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// A piece of course content, optionally tied to a lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChunk {
    #[serde(default)]
    pub lesson_number: Option<i64>,
    pub content: String,
}

/// A course with its catalog metadata and content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDocument {
    pub title: String,
    #[serde(default)]
    pub course_link: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub lessons: Vec<LessonEntry>,
    #[serde(default)]
    pub chunks: Vec<ContentChunk>,
}

impl CourseDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            course_link: None,
            instructor: None,
            lessons: Vec::new(),
            chunks: Vec::new(),
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.course_link = Some(link.into());
        self
    }

    pub fn with_lesson(
        mut self,
        number: i64,
        title: impl Into<String>,
        link: Option<&str>,
    ) -> Self {
        self.lessons.push(LessonEntry {
            lesson_number: Some(number),
            lesson_title: Some(title.into()),
            lesson_link: link.map(str::to_string),
        });
        self
    }

    pub fn with_chunk(mut self, lesson_number: Option<i64>, content: impl Into<String>) -> Self {
        self.chunks.push(ContentChunk {
            lesson_number,
            content: content.into(),
        });
        self
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    courses: Vec<CourseDocument>,
}

/// Term-overlap retrieval over courses held in memory
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    courses: Vec<CourseDocument>,
    max_results: usize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RESULTS)
    }
}

impl InMemoryStore {
    pub fn new(max_results: usize) -> Self {
        Self {
            courses: Vec::new(),
            max_results,
        }
    }

    /// Load courses from a JSON file shaped `{"courses": [...]}`
    pub fn load(path: impl AsRef<Path>, max_results: usize) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let file: CatalogFile = serde_json::from_str(&content)?;

        let mut store = Self::new(max_results);
        for course in file.courses {
            store.add_course(course);
        }
        info!(
            "Loaded {} courses from {}",
            store.courses.len(),
            path.as_ref().display()
        );
        Ok(store)
    }

    /// Add a course, replacing any course with the same title
    pub fn add_course(&mut self, course: CourseDocument) {
        match self.courses.iter_mut().find(|c| c.title == course.title) {
            Some(existing) => *existing = course,
            None => self.courses.push(course),
        }
    }

    pub fn with_course(mut self, course: CourseDocument) -> Self {
        self.add_course(course);
        self
    }

    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    fn course(&self, title: &str) -> Option<&CourseDocument> {
        self.courses.iter().find(|c| c.title == title)
    }

    /// Exact title, then case-insensitive match, then substring, then best word overlap
    fn resolve(&self, fuzzy: &str) -> Option<String> {
        if let Some(c) = self.course(fuzzy) {
            return Some(c.title.clone());
        }

        let needle = fuzzy.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(c) = self.courses.iter().find(|c| c.title.to_lowercase() == needle) {
            return Some(c.title.clone());
        }

        if let Some(c) = self.courses.iter().find(|c| c.title.to_lowercase().contains(&needle)) {
            return Some(c.title.clone());
        }

        let wanted = tokens(fuzzy);
        self.courses
            .iter()
            .map(|c| (overlap(&wanted, &tokens(&c.title)), c))
            .filter(|(score, _)| *score > 0)
            .fold(None, |best: Option<(usize, &CourseDocument)>, (score, c)| match best {
                Some((best_score, _)) if best_score >= score => best,
                _ => Some((score, c)),
            })
            .map(|(_, c)| c.title.clone())
    }
}

fn tokens(text: &str) -> HashSet<String> {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn overlap(a: &HashSet<String>, b: &HashSet<String>) -> usize {
    a.intersection(b).count()
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<i64>,
    ) -> SearchResults {
        let course_title = match course_name {
            Some(name) => match self.resolve(name) {
                Some(title) => Some(title),
                None => {
                    return SearchResults::with_error(format!(
                        "No course found matching '{}'",
                        name
                    ));
                }
            },
            None => None,
        };

        let wanted = tokens(query);
        let mut hits: Vec<(usize, &CourseDocument, usize, &ContentChunk)> = self
            .courses
            .iter()
            .filter(|c| course_title.as_deref().is_none_or(|t| c.title == t))
            .flat_map(|c| c.chunks.iter().enumerate().map(move |(i, chunk)| (c, i, chunk)))
            .filter(|(_, _, chunk)| lesson_number.is_none_or(|n| chunk.lesson_number == Some(n)))
            .map(|(c, i, chunk)| (overlap(&wanted, &tokens(&chunk.content)), c, i, chunk))
            .collect();

        // stable sort keeps catalog order among equal scores
        hits.sort_by(|a, b| b.0.cmp(&a.0));
        hits.truncate(self.max_results);

        debug!(
            "search '{}' course={:?} lesson={:?}: {} hits",
            query,
            course_title,
            lesson_number,
            hits.len()
        );

        let (documents, metadata) = hits
            .into_iter()
            .map(|(_, c, i, chunk)| {
                (
                    chunk.content.clone(),
                    ChunkMetadata {
                        course_title: Some(c.title.clone()),
                        lesson_number: chunk.lesson_number,
                        chunk_index: Some(i),
                    },
                )
            })
            .unzip();

        SearchResults::new(documents, metadata)
    }

    async fn resolve_course_name(&self, fuzzy: &str) -> Result<Option<String>> {
        Ok(self.resolve(fuzzy))
    }

    async fn get_catalog_entry(&self, title: &str) -> Result<Option<CatalogEntry>> {
        let Some(course) = self.course(title) else {
            return Ok(None);
        };

        Ok(Some(CatalogEntry {
            title: course.title.clone(),
            instructor: course.instructor.clone(),
            course_link: course.course_link.clone(),
            lessons_json: Some(serde_json::to_string(&course.lessons)?),
            lesson_count: course.lessons.len(),
        }))
    }

    async fn course_titles(&self) -> Result<Vec<String>> {
        Ok(self.courses.iter().map(|c| c.title.clone()).collect())
    }
}
