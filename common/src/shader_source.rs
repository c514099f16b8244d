use std::path::{Path, PathBuf};

use thiserror::Error;

use gl_wrapper::program::ShaderStage;

/// Marks the line that starts a new section.
pub const SENTINEL: &str = "#shader";

/// Vertex and fragment source read from one combined file.
///
/// The file is split on lines containing `#shader`; the word `vertex` or
/// `fragment` after the sentinel picks the section the following lines go
/// to. Lines before the first sentinel belong to no section and are dropped.
///
/// ```text
/// #shader vertex
/// #version 330 core
/// ...
/// #shader fragment
/// #version 330 core
/// ...
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    pub fn parse(src: &str) -> Self {
        let mut out = Self::default();
        let mut active: Option<ShaderStage> = None;

        for (number, line) in src.lines().enumerate() {
            if let Some(pos) = line.find(SENTINEL) {
                let rest = &line[pos + SENTINEL.len()..];

                if rest.contains("vertex") {
                    active = Some(ShaderStage::Vertex);
                } else if rest.contains("fragment") {
                    active = Some(ShaderStage::Fragment);
                } else {
                    log::warn!(
                        "line {}: unknown shader section '{}', keeping current one",
                        number + 1,
                        rest.trim()
                    );
                }

                continue;
            }

            if let Some(stage) = active {
                let section = out.section_mut(stage);
                section.push_str(line);
                section.push('\n');
            }
        }

        out
    }

    pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|e| SourceError::Io {
            path: path.to_owned(),
            source: e,
        })?;

        let parsed = Self::parse(&src);

        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            if parsed.section(stage).is_empty() {
                log::warn!("{} has an empty {stage} section", path.display());
            }
        }

        Ok(parsed)
    }

    pub fn section(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }

    fn section_mut(&mut self, stage: ShaderStage) -> &mut String {
        match stage {
            ShaderStage::Vertex => &mut self.vertex,
            ShaderStage::Fragment => &mut self.fragment,
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not read shader file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn splits_two_sections() {
        let src = ShaderSource::parse("#shader vertex\nA\n#shader fragment\nB\n");

        assert_eq!(src.vertex, "A\n");
        assert_eq!(src.fragment, "B\n");
    }

    #[test]
    fn lines_before_first_sentinel_are_dropped() {
        let src = ShaderSource::parse("// header\n\n#shader fragment\nB\n#shader vertex\nA\n");

        assert_eq!(src.vertex, "A\n");
        assert_eq!(src.fragment, "B\n");
    }

    #[test]
    fn line_count_is_preserved() {
        let body = ["#version 330 core", "", "  #define X 1", "void main() {}", "}"];
        let text = format!("#shader vertex\n{}\n#shader fragment\n", body.join("\n"));

        let src = ShaderSource::parse(&text);

        assert_eq!(src.vertex.lines().count(), body.len());
        assert_eq!(src.vertex.matches('\n').count(), body.len());
        assert!(src.fragment.is_empty());
    }

    #[test]
    fn keyword_must_follow_sentinel() {
        let src = ShaderSource::parse(
            "#shader vertex\nA\n// fragment #shader\nstill vertex\n#shader   fragment   \nB\n",
        );

        assert_eq!(src.vertex, "A\nstill vertex\n");
        assert_eq!(src.fragment, "B\n");
    }

    #[test]
    fn repeated_sections_append() {
        let src = ShaderSource::parse("#shader vertex\nA\n#shader fragment\nB\n#shader vertex\nC\n");

        assert_eq!(src.vertex, "A\nC\n");
        assert_eq!(src.fragment, "B\n");
    }

    #[test]
    fn crlf_input() {
        let src = ShaderSource::parse("#shader vertex\r\nA\r\n#shader fragment\r\nB\r\n");

        assert_eq!(src.vertex, "A\n");
        assert_eq!(src.fragment, "B\n");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "#shader vertex\nA\n#shader fragment\nB\n").unwrap();

        let src = ShaderSource::load_path(file.path()).unwrap();
        assert_eq!(src.section(ShaderStage::Vertex), "A\n");
        assert_eq!(src.section(ShaderStage::Fragment), "B\n");
    }

    #[test]
    fn bundled_shader_has_both_stages() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../res/shaders/basic.shader");
        let src = ShaderSource::load_path(path).unwrap();

        assert!(src.vertex.starts_with("#version 330 core\n"));
        assert!(src.vertex.contains("gl_Position = position;"));
        assert!(src.fragment.starts_with("#version 330 core\n"));
        assert!(src.fragment.contains("uniform vec4 u_Color;"));
        assert!(!src.vertex.contains(SENTINEL));
        assert!(!src.fragment.contains(SENTINEL));
    }

    #[test]
    fn missing_file_names_path() {
        let err = ShaderSource::load_path("does/not/exist.shader").unwrap_err();

        assert!(err.to_string().contains("does/not/exist.shader"));
    }
}
