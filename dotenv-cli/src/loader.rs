//! Sequential loading of dotenv files into an in-memory environment.

use std::path::{Path, PathBuf};

use dotenv_parser::{
    LoadedVars, NoVariables, ParseContext, ParseError, Parser, VariableSource, Variables,
};

const LOAD: &str = "load";

/// Represents an error that occurred while loading a file.
#[derive(Debug, thiserror::Error)]
pub(crate) enum LoadError {
    /// The path does not exist.
    #[error("file not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// The path exists but is a directory or other non-file.
    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// The file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Unreadable {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The file's contents are not valid dotenv text.
    #[error("{source}")]
    Parse {
        /// The file that failed to parse.
        path: PathBuf,
        /// The underlying error.
        source: ParseError,
        /// The offending line, with a caret under the failure column.
        details: String,
    },
}

/// Loads files one after another, applying each file's variables before the next is parsed.
pub(crate) struct Loader<'a> {
    override_existing: bool,
    ambient: &'a dyn VariableSource,
    fallback: &'a dyn VariableSource,
    environment: Variables,
    loaded: LoadedVars,
}

impl<'a> Loader<'a> {
    pub fn new(override_existing: bool) -> Self {
        Self {
            override_existing,
            ambient: &NoVariables,
            fallback: &NoVariables,
            environment: Variables::new(),
            loaded: LoadedVars::new(),
        }
    }

    /// Resolves references that nothing else defines against the given source.
    pub fn with_external(mut self, source: &'a dyn VariableSource) -> Self {
        self.ambient = source;
        self.fallback = source;
        self
    }

    /// Applies a variable directly, as if it were already present in the environment.
    pub fn preset(&mut self, name: String, value: String) {
        self.environment.insert(name, value);
    }

    /// Reads, parses and applies the file at `path`.
    pub fn load(&mut self, path: &Path) -> Result<(), LoadError> {
        let contents = read_file(path)?;

        tracing::debug!(
            target: LOAD,
            "loading {} with {} names already loaded",
            path.display(),
            self.loaded.len()
        );

        let variables = {
            let context = ParseContext::builder()
                .loaded_vars(self.loaded.clone())
                .applied(&self.environment)
                .ambient(self.ambient)
                .fallback(self.fallback)
                .build();

            Parser::builder()
                .context(context)
                .source_info(path.display().to_string())
                .build()
                .parse(&contents)
                .map_err(|source| LoadError::Parse {
                    path: path.to_owned(),
                    details: source.details(&contents),
                    source,
                })?
        };

        self.apply(variables);

        Ok(())
    }

    /// Names applied by an earlier file may be replaced; values present before loading are
    /// kept unless overriding.
    fn apply(&mut self, variables: Variables) {
        for (name, value) in variables {
            let replaceable = self.override_existing
                || self.loaded.contains(&name)
                || !self.environment.contains_key(&name);

            if replaceable {
                tracing::debug!(target: LOAD, "applying {name}");
                self.environment.insert(name.clone(), value);
                self.loaded.insert(name);
            } else {
                tracing::debug!(target: LOAD, "keeping existing value of {name}");
            }
        }
    }

    /// Returns the names applied from files so far.
    pub const fn loaded(&self) -> &LoadedVars {
        &self.loaded
    }

    pub fn into_environment(self) -> Variables {
        self.environment
    }
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(LoadError::PathNotFound(path.to_owned()));
        }
        Err(source) => {
            return Err(LoadError::Unreadable {
                path: path.to_owned(),
                source,
            });
        }
    };

    if !metadata.is_file() {
        return Err(LoadError::NotAFile(path.to_owned()));
    }

    std::fs::read_to_string(path).map_err(|source| LoadError::Unreadable {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::{assert_eq, assert_matches};
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> Result<PathBuf> {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path)?;
        file.write_all(contents.as_bytes())?;
        Ok(path)
    }

    fn pairs(variables: &Variables) -> Vec<(&str, &str)> {
        variables
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect()
    }

    #[test]
    fn later_files_see_earlier_values() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let first = write_file(&dir, "first.env", "HOST=localhost\n")?;
        let second = write_file(&dir, "second.env", "URL=http://$HOST/\n")?;

        let mut loader = Loader::new(false);
        loader.load(&first)?;
        loader.load(&second)?;

        assert_eq!(loader.loaded().to_list(), "HOST,URL");
        assert_eq!(
            pairs(&loader.into_environment()),
            vec![("HOST", "localhost"), ("URL", "http://localhost/")]
        );
        Ok(())
    }

    #[test]
    fn later_files_replace_loaded_values() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let first = write_file(&dir, "first.env", "A=1\n")?;
        let second = write_file(&dir, "second.env", "A=2\nB=$A\n")?;

        let mut loader = Loader::new(false);
        loader.load(&first)?;
        loader.load(&second)?;

        assert_eq!(
            pairs(&loader.into_environment()),
            vec![("A", "2"), ("B", "2")]
        );
        Ok(())
    }

    #[test]
    fn presets_survive_every_file_without_override() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let first = write_file(&dir, "first.env", "A=1\nB=$A\n")?;
        let second = write_file(&dir, "second.env", "A=2\nC=$A\n")?;

        let mut loader = Loader::new(false);
        loader.preset("A".to_owned(), "preset".to_owned());
        loader.load(&first)?;
        loader.load(&second)?;

        assert_eq!(loader.loaded().to_list(), "B,C");
        assert_eq!(
            pairs(&loader.into_environment()),
            vec![("A", "preset"), ("B", "preset"), ("C", "preset")]
        );
        Ok(())
    }

    #[test]
    fn override_replaces_values() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let first = write_file(&dir, "first.env", "A=1\n")?;
        let second = write_file(&dir, "second.env", "A=2\n")?;

        let mut loader = Loader::new(true);
        loader.load(&first)?;
        loader.load(&second)?;

        assert_eq!(pairs(&loader.into_environment()), vec![("A", "2")]);
        Ok(())
    }

    #[test]
    fn presets_take_precedence_over_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file = write_file(&dir, ".env", "NAME=file\nREF=$NAME\n")?;

        let mut loader = Loader::new(false);
        loader.preset("NAME".to_owned(), "preset".to_owned());
        loader.load(&file)?;

        assert_eq!(loader.loaded().to_list(), "REF");
        assert_eq!(
            pairs(&loader.into_environment()),
            vec![("NAME", "preset"), ("REF", "preset")]
        );
        Ok(())
    }

    #[test]
    fn external_source_fills_in_undefined_names() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file = write_file(&dir, ".env", "A=$EXTERNAL\n")?;
        let external: Variables = [("EXTERNAL".to_owned(), "outside".to_owned())]
            .into_iter()
            .collect();

        let mut loader = Loader::new(false).with_external(&external);
        loader.load(&file)?;

        assert_eq!(pairs(&loader.into_environment()), vec![("A", "outside")]);
        Ok(())
    }

    #[test]
    fn path_errors() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut loader = Loader::new(false);

        assert_matches!(
            loader.load(&dir.path().join("missing.env")),
            Err(LoadError::PathNotFound(_))
        );
        assert_matches!(loader.load(dir.path()), Err(LoadError::NotAFile(_)));
        Ok(())
    }

    #[test]
    fn parse_errors_carry_path_and_details() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file = write_file(&dir, "bad.env", "A=1\nB='open\n")?;

        let mut loader = Loader::new(false);
        let err = loader.load(&file).err();
        assert_matches!(err, Some(LoadError::Parse { .. }));

        if let Some(LoadError::Parse {
            path,
            source,
            details,
        }) = err
        {
            assert_eq!(path, file);
            assert_eq!(source.line(), 2);
            assert_eq!(details, "2 | B='open\n  |   ^");
            assert!(source.to_string().contains("bad.env"));
        }
        Ok(())
    }
}
