//! Map entities from the tile's entity string.
//!
//! The format is a sequence of `{ "key" "value" ... }` blocks. Keys keep
//! their order and duplicates, lookups return the last value like the game.

use crate::errors::{BakeError, Result};
use crate::float_types::Real;
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    pub pairs: Vec<(String, String)>,
}

impl Entity {
    pub fn value_for_key(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn classname(&self) -> &str {
        self.value_for_key("classname").unwrap_or("")
    }

    /// Leading float of the value, 0 when missing or unparsable.
    pub fn float_for_key(&self, key: &str) -> Real {
        self.value_for_key(key)
            .and_then(|v| v.split_whitespace().next())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0)
    }

    pub fn int_for_key(&self, key: &str) -> i32 {
        self.float_for_key(key) as i32
    }

    /// Up to three whitespace separated floats, missing components are 0.
    pub fn vector_for_key(&self, key: &str) -> Vector3<Real> {
        let mut out = Vector3::zeros();
        if let Some(value) = self.value_for_key(key) {
            for (i, part) in value.split_whitespace().take(3).enumerate() {
                out[i] = part.parse().unwrap_or(0.0);
            }
        }
        out
    }

    pub fn origin(&self) -> Point3<Real> {
        Point3::from(self.vector_for_key("origin"))
    }

    /// Brush model index from a `"*N"` model key.
    pub fn model_index(&self) -> Option<usize> {
        self.value_for_key("model")?.strip_prefix('*')?.parse().ok()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityList {
    pub entities: Vec<Entity>,
    by_targetname: HashMap<String, usize>,
    by_model: HashMap<usize, usize>,
}

impl EntityList {
    pub fn parse(text: &str) -> Result<Self> {
        let entities = parse_entities(text)?;
        let mut by_targetname = HashMap::new();
        let mut by_model = HashMap::new();
        for (i, entity) in entities.iter().enumerate() {
            if let Some(name) = entity.value_for_key("targetname") {
                by_targetname.insert(name.to_owned(), i);
            }
            if let Some(model) = entity.model_index() {
                by_model.insert(model, i);
            }
        }
        Ok(EntityList {
            entities,
            by_targetname,
            by_model,
        })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn worldspawn(&self) -> Option<&Entity> {
        self.entities
            .first()
            .filter(|e| e.classname() == "worldspawn")
    }

    pub fn find_target(&self, name: &str) -> Option<&Entity> {
        self.by_targetname.get(name).map(|&i| &self.entities[i])
    }

    /// The brush entity owning model `model`, never the world.
    pub fn for_model(&self, model: usize) -> Option<&Entity> {
        if model == 0 {
            return None;
        }
        self.by_model.get(&model).map(|&i| &self.entities[i])
    }

    /// Offset applied to a model's faces, zero for the world.
    pub fn model_origin(&self, model: usize) -> Vector3<Real> {
        self.for_model(model)
            .map(|e| e.vector_for_key("origin"))
            .unwrap_or_else(Vector3::zeros)
    }
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Open,
    Close,
    Text(&'a str),
}

struct Tokenizer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn next_token(&mut self) -> Result<Option<Token<'a>>> {
        let bytes = self.text.as_bytes();
        loop {
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            // line comments
            if bytes[self.pos..].starts_with(b"//") {
                while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            break;
        }

        let Some(&c) = bytes.get(self.pos) else {
            return Ok(None);
        };
        match c {
            b'{' => {
                self.pos += 1;
                Ok(Some(Token::Open))
            },
            b'}' => {
                self.pos += 1;
                Ok(Some(Token::Close))
            },
            b'"' => {
                let start = self.pos + 1;
                let end = self.text[start..]
                    .find('"')
                    .map(|off| start + off)
                    .ok_or_else(|| {
                        BakeError::CorruptTile(format!("unterminated quote at byte {}", self.pos))
                    })?;
                self.pos = end + 1;
                Ok(Some(Token::Text(&self.text[start..end])))
            },
            _ => {
                let start = self.pos;
                while self.pos < bytes.len()
                    && !bytes[self.pos].is_ascii_whitespace()
                    && !matches!(bytes[self.pos], b'{' | b'}' | b'"')
                {
                    self.pos += 1;
                }
                Ok(Some(Token::Text(&self.text[start..self.pos])))
            },
        }
    }
}

/// Parse every entity block of an entity string.
pub fn parse_entities(text: &str) -> Result<Vec<Entity>> {
    let mut tokens = Tokenizer { text, pos: 0 };
    let mut entities = Vec::new();

    while let Some(token) = tokens.next_token()? {
        if token != Token::Open {
            return Err(BakeError::CorruptTile(format!(
                "entity {}: expected '{{', found {token:?}",
                entities.len()
            )));
        }

        let mut entity = Entity::default();
        loop {
            let key = match tokens.next_token()? {
                Some(Token::Close) => break,
                Some(Token::Text(key)) => key,
                other => {
                    return Err(BakeError::CorruptTile(format!(
                        "entity {}: expected key, found {other:?}",
                        entities.len()
                    )));
                },
            };
            let Some(Token::Text(value)) = tokens.next_token()? else {
                return Err(BakeError::CorruptTile(format!(
                    "entity {}: key {key} has no value",
                    entities.len()
                )));
            };
            entity.pairs.push((key.to_owned(), value.to_owned()));
        }
        entities.push(entity);
    }

    Ok(entities)
}
