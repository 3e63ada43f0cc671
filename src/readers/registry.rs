//! Reader lookup by manifest name or by target type.
//!
//! The registry is built once from the compiled-in template tables and
//! keeps four maps: reader tag and target type for plain readers, and the
//! same two for open generic templates. Lookups parse the requested name
//! with [`TypeSpec`], so assembly clauses and spacing do not matter.
//!
//! Closing a generic template over its arguments yields a new reader; the
//! registry caches it under both of its names so the same instantiation is
//! handed out every time. The cache is the only mutable state and sits
//! behind a lock, so one registry can serve any number of decode sessions
//! at once.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use super::generic::{self, GenericTarget, GenericTemplate};
use super::{ReaderTemplate, TypeReader, audio, content, enums, graphics, math, primitive};
use crate::typename::TypeSpec;
use crate::{Error, Result};

/// A template plus its lazily built reader.
struct Entry {
    template: ReaderTemplate,
    reader: OnceLock<Arc<dyn TypeReader>>,
}

impl Entry {
    fn reader(&self) -> Arc<dyn TypeReader> {
        Arc::clone(self.reader.get_or_init(|| self.template.instantiate()))
    }
}

#[derive(Default)]
struct Instantiated {
    by_reader_tag: HashMap<String, Arc<dyn TypeReader>>,
    by_target_type: HashMap<String, Arc<dyn TypeReader>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    ReaderTag,
    TargetType,
}

/// Maps reader tags and target types to readers.
pub struct Registry {
    entries: Vec<Entry>,
    by_reader_tag: HashMap<&'static str, usize>,
    by_target_type: HashMap<&'static str, usize>,
    generics: Vec<GenericTemplate>,
    generic_by_reader_tag: HashMap<&'static str, usize>,
    generic_by_target_type: HashMap<&'static str, usize>,
    array: Option<usize>,
    instantiated: RwLock<Instantiated>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("readers", &self.entries.len())
            .field("generics", &self.generics.len())
            .field("instantiated", &self.instantiated.read().by_reader_tag.len())
            .finish()
    }
}

impl Registry {
    /// Build a registry from explicit tables.
    ///
    /// Fails with [`Error::DuplicateReader`] if two readers share a reader
    /// tag or a target type, or two generic templates share a name.
    pub fn new(
        templates: impl IntoIterator<Item = ReaderTemplate>,
        generics: impl IntoIterator<Item = GenericTemplate>,
    ) -> Result<Self> {
        let mut registry = Self {
            entries: Vec::new(),
            by_reader_tag: HashMap::new(),
            by_target_type: HashMap::new(),
            generics: Vec::new(),
            generic_by_reader_tag: HashMap::new(),
            generic_by_target_type: HashMap::new(),
            array: None,
            instantiated: RwLock::new(Instantiated::default()),
        };

        for template in templates {
            let index = registry.entries.len();
            claim(&mut registry.by_reader_tag, template.reader_tag, index)?;
            claim(&mut registry.by_target_type, template.target_type, index)?;
            registry.entries.push(Entry {
                template,
                reader: OnceLock::new(),
            });
        }

        for template in generics {
            let index = registry.generics.len();
            claim(&mut registry.generic_by_reader_tag, template.reader_tag, index)?;
            match template.target {
                GenericTarget::Named(name) => claim(&mut registry.generic_by_target_type, name, index)?,
                GenericTarget::ArrayOf => {
                    if registry.array.replace(index).is_some() {
                        return Err(Error::DuplicateReader(template.reader_tag.to_owned()));
                    }
                }
                GenericTarget::Underlying => {}
            }
            registry.generics.push(template);
        }

        Ok(registry)
    }

    /// Registry of every reader compiled into the crate.
    pub fn builtin() -> Result<Self> {
        let templates = [
            primitive::TEMPLATES,
            math::TEMPLATES,
            content::TEMPLATES,
            graphics::TEMPLATES,
            audio::TEMPLATES,
        ]
        .into_iter()
        .flatten()
        .copied()
        .chain(enums::ENUMS.iter().map(|&def| ReaderTemplate::enumeration(def)));
        Self::new(templates, generic::TEMPLATES.iter().copied())
    }

    /// Process-wide builtin registry.
    ///
    /// # Panics
    /// Panics if the builtin tables contain a duplicate, which is a bug in
    /// this crate rather than in any input.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(|| match Registry::builtin() {
            Ok(registry) => registry,
            Err(e) => panic!("builtin type reader tables are inconsistent: {e}"),
        })
    }

    /// Resolve a manifest reader name.
    pub fn resolve_by_tag(&self, reader_tag: &str) -> Result<Arc<dyn TypeReader>> {
        let spec = TypeSpec::parse(reader_tag)?;
        self.resolve(&spec, Key::ReaderTag)
    }

    /// Resolve the reader that produces `type_name`.
    pub fn resolve_by_type(&self, type_name: &str) -> Result<Arc<dyn TypeReader>> {
        let spec = TypeSpec::parse(type_name)?;
        self.resolve(&spec, Key::TargetType)
    }

    /// All plain templates, in registration order.
    pub fn templates(&self) -> impl Iterator<Item = &ReaderTemplate> {
        self.entries.iter().map(|e| &e.template)
    }

    fn resolve(&self, spec: &TypeSpec, key: Key) -> Result<Arc<dyn TypeReader>> {
        let full_name = spec.full_name();
        if let Some(reader) = self.lookup(&full_name, key) {
            return Ok(reader);
        }

        let (template, args) = self
            .generic_for(spec, key)
            .ok_or_else(|| Error::ReaderNotFound(full_name.clone()))?;
        if template.arity != args.len() {
            return Err(Error::ReaderNotFound(full_name));
        }
        let children = args
            .iter()
            .map(|arg| self.resolve(arg, Key::TargetType))
            .collect::<Result<Vec<_>>>()?;

        let reader = template.instantiate(children);
        log::debug!(
            "instantiated {} -> {}",
            reader.reader_tag(),
            reader.target_type()
        );
        Ok(self.remember(reader))
    }

    fn lookup(&self, full_name: &str, key: Key) -> Option<Arc<dyn TypeReader>> {
        let plain = match key {
            Key::ReaderTag => &self.by_reader_tag,
            Key::TargetType => &self.by_target_type,
        };
        if let Some(&index) = plain.get(full_name) {
            return Some(self.entries[index].reader());
        }
        let cache = self.instantiated.read();
        let cached = match key {
            Key::ReaderTag => &cache.by_reader_tag,
            Key::TargetType => &cache.by_target_type,
        };
        cached.get(full_name).cloned()
    }

    /// Pick the generic template that can produce `spec`, with the type
    /// arguments to close it over.
    fn generic_for(&self, spec: &TypeSpec, key: Key) -> Option<(&GenericTemplate, Vec<TypeSpec>)> {
        if spec.is_generic() && spec.array_spec.is_empty() && spec.pointer_level == 0 && !spec.is_byref {
            let map = match key {
                Key::ReaderTag => &self.generic_by_reader_tag,
                Key::TargetType => &self.generic_by_target_type,
            };
            let index = *map.get(spec.base_name().as_str())?;
            return Some((&self.generics[index], spec.generic_params.clone()));
        }
        if key == Key::TargetType {
            let last = spec.array_spec.last()?;
            if last.dimensions == 1 && !last.bound {
                let element = spec.element_type()?;
                return Some((&self.generics[self.array?], vec![element]));
            }
        }
        None
    }

    /// Cache an instantiation under both of its names. If another session
    /// got there first, its reader is kept and returned.
    fn remember(&self, reader: Arc<dyn TypeReader>) -> Arc<dyn TypeReader> {
        let mut cache = self.instantiated.write();
        let reader = Arc::clone(
            cache
                .by_reader_tag
                .entry(reader.reader_tag().to_owned())
                .or_insert(reader),
        );
        cache
            .by_target_type
            .entry(reader.target_type().to_owned())
            .or_insert_with(|| Arc::clone(&reader));
        reader
    }
}

fn claim(map: &mut HashMap<&'static str, usize>, name: &'static str, index: usize) -> Result<()> {
    if map.insert(name, index).is_some() {
        return Err(Error::DuplicateReader(name.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::{ContentInput, Value};

    fn registry() -> Registry {
        Registry::builtin().expect("builtin tables are consistent")
    }

    #[test]
    fn test_builtin_names_are_canonical() {
        let r = registry();
        for t in r.templates() {
            let tag = TypeSpec::parse(t.reader_tag).expect("tag parses");
            assert_eq!(tag.full_name(), t.reader_tag);
            let target = TypeSpec::parse(t.target_type).expect("target parses");
            assert_eq!(target.full_name(), t.target_type);
        }
    }

    #[test]
    fn test_resolve_plain_by_tag_and_type() {
        let r = registry();
        let by_tag = r
            .resolve_by_tag("Microsoft.Xna.Framework.Content.Int32Reader")
            .expect("Int32Reader");
        assert_eq!(by_tag.target_type(), "System.Int32");
        assert!(by_tag.is_value_type());
        let by_type = r.resolve_by_type("System.Int32").expect("System.Int32");
        assert!(Arc::ptr_eq(&by_tag, &by_type));
    }

    #[test]
    fn test_resolve_ignores_assembly_clause() {
        let r = registry();
        let reader = r
            .resolve_by_tag(
                "Microsoft.Xna.Framework.Content.Texture2DReader, Microsoft.Xna.Framework.Graphics, Version=4.0.0.0, Culture=neutral, PublicKeyToken=842cf8be1de50553",
            )
            .expect("Texture2DReader");
        assert_eq!(reader.target_type(), "Microsoft.Xna.Framework.Graphics.Texture2D");
    }

    #[test]
    fn test_generic_instantiation_is_idempotent() {
        let r = registry();
        let first = r
            .resolve_by_tag("Microsoft.Xna.Framework.Content.ListReader`1[[System.Int32]]")
            .expect("first resolve");
        let second = r
            .resolve_by_tag("Microsoft.Xna.Framework.Content.ListReader`1[[System.Int32, mscorlib]]")
            .expect("second resolve");
        assert_eq!(first.reader_tag(), second.reader_tag());
        assert_eq!(first.target_type(), second.target_type());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.target_type(), "System.Collections.Generic.List`1[[System.Int32]]");
        let by_type = r
            .resolve_by_type("System.Collections.Generic.List`1[[System.Int32]]")
            .expect("by type");
        assert!(Arc::ptr_eq(&first, &by_type));
    }

    #[test]
    fn test_nested_generics_resolve_children_by_type() {
        let r = registry();
        let reader = r
            .resolve_by_tag(
                "Microsoft.Xna.Framework.Content.DictionaryReader`2[[System.String],[System.Collections.Generic.List`1[[Microsoft.Xna.Framework.Vector3]]]]",
            )
            .expect("dictionary of lists");
        assert_eq!(
            reader.target_type(),
            "System.Collections.Generic.Dictionary`2[[System.String],[System.Collections.Generic.List`1[[Microsoft.Xna.Framework.Vector3]]]]"
        );
        assert_eq!(reader.generic_args().len(), 2);
        assert!(!reader.generic_args()[1].is_value_type());
    }

    #[test]
    fn test_array_by_type() {
        let r = registry();
        let reader = r.resolve_by_type("System.Single[]").expect("float array");
        assert_eq!(reader.target_type(), "System.Single[]");
        assert_eq!(reader.reader_tag(), "Microsoft.Xna.Framework.Content.ArrayReader`1[[System.Single]]");
        let by_tag = r
            .resolve_by_tag("Microsoft.Xna.Framework.Content.ArrayReader`1[[System.Single]]")
            .expect("by tag");
        assert!(Arc::ptr_eq(&reader, &by_tag));
        assert!(r.resolve_by_type("System.Single[,]").is_err());
    }

    #[test]
    fn test_enum_reader_targets_underlying_type() {
        let r = registry();
        let reader = r
            .resolve_by_tag(
                "Microsoft.Xna.Framework.Content.EnumReader`1[[Microsoft.Xna.Framework.Graphics.SurfaceFormat]]",
            )
            .expect("enum reader");
        assert!(reader.is_enum());
        assert!(reader.is_value_type());
        assert_eq!(reader.target_type(), "Microsoft.Xna.Framework.Graphics.SurfaceFormat");
    }

    #[test]
    fn test_unknown_names() {
        let r = registry();
        assert!(matches!(
            r.resolve_by_tag("Game.Readers.LevelReader"),
            Err(Error::ReaderNotFound(_))
        ));
        assert!(matches!(
            r.resolve_by_tag("Microsoft.Xna.Framework.Content.ListReader`1[[Game.Level]]"),
            Err(Error::ReaderNotFound(_))
        ));
        assert!(matches!(
            r.resolve_by_tag("Microsoft.Xna.Framework.Content.ListReader`1[[System.Int32],[System.Int32]]"),
            Err(Error::ReaderNotFound(_))
        ));
        assert!(matches!(r.resolve_by_tag("Broken]"), Err(Error::TypeName { .. })));
    }

    fn read_nothing(_: &mut ContentInput<'_>) -> Result<Value> {
        Ok(Value::Null)
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let a = ReaderTemplate::value("A.Reader", "A", read_nothing);
        let same_tag = ReaderTemplate::value("A.Reader", "B", read_nothing);
        let same_type = ReaderTemplate::value("B.Reader", "A", read_nothing);
        assert!(matches!(
            Registry::new([a, same_tag], Vec::<GenericTemplate>::new()),
            Err(Error::DuplicateReader(name)) if name == "A.Reader"
        ));
        assert!(matches!(
            Registry::new([a, same_type], Vec::<GenericTemplate>::new()),
            Err(Error::DuplicateReader(name)) if name == "A"
        ));
        let twice = generic::TEMPLATES[1];
        assert!(matches!(
            Registry::new(Vec::<ReaderTemplate>::new(), [twice, twice]),
            Err(Error::DuplicateReader(_))
        ));
    }

    #[test]
    fn test_concurrent_instantiation() {
        let r = registry();
        let readers: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        r.resolve_by_tag(
                            "Microsoft.Xna.Framework.Content.ListReader`1[[System.Collections.Generic.List`1[[System.Char]]]]",
                        )
                        .expect("resolve")
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().expect("thread")).collect()
        });
        for reader in &readers[1..] {
            assert_eq!(reader.reader_tag(), readers[0].reader_tag());
        }
        let cached = r
            .resolve_by_type("System.Collections.Generic.List`1[[System.Collections.Generic.List`1[[System.Char]]]]")
            .expect("cached");
        assert_eq!(cached.reader_tag(), readers[0].reader_tag());
    }
}
