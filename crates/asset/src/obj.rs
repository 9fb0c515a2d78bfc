//! Wavefront geometry (`.obj`) parser.
//!
//! Faces are triangles whose corners reference the vertex table of the
//! current object and the file-wide normal table. Vertex indices restart at
//! 1 on every `o`; normal indices never do.
//! Meshes store the resolved positions and normals, not indices.

use std::sync::Arc;

use corelib::Vec3;
use lexer::{TokenKind, Tokenizer};

use crate::{
    error::{AssetError, AssetResult, FormatError},
    mesh::{MaterialLibrary, Mesh, Model},
    mtl, path, read_source,
    stream::TokenStream,
};

/// Supplies the material libraries named by `mtllib`.
pub trait MaterialSource {
    fn material_library(&mut self, path: &str) -> AssetResult<Arc<MaterialLibrary>>;
}

/// Reads every requested library straight from disk.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsMaterials;

impl MaterialSource for FsMaterials {
    fn material_library(&mut self, path: &str) -> AssetResult<Arc<MaterialLibrary>> {
        let src = read_source(path)?;
        let library = mtl::parse_mtl(&src, path).map_err(|e| AssetError::format(path, e))?;
        Ok(Arc::new(library))
    }
}

/// Load an OBJ model from a file path, reading its material library from disk.
pub fn load_obj_from_path(path: &str) -> AssetResult<Model> {
    let src = read_source(path)?;
    parse_obj(&src, path, &mut FsMaterials)
}

/// Parse OBJ source. `path` locates `mtllib` files and names the asset in errors.
pub fn parse_obj(src: &str, path: &str, materials: &mut dyn MaterialSource) -> AssetResult<Model> {
    let lexer = Tokenizer::new(src)
        .dots_in_identifiers(true)
        .with_error_hook(move |err| log::warn!("{path}:{err}"));
    let mut parser = ObjParser {
        path,
        tokens: TokenStream::new(lexer),
        model: Model::default(),
        positions: Vec::new(),
        normals: Vec::new(),
        library: None,
    };

    loop {
        let token = parser.tokens.current();
        match token.kind {
            TokenKind::End => break,
            TokenKind::CommentStart => parser.tokens.skip_line(token.line),
            TokenKind::Identifier("mtllib") => {
                parser.tokens.advance();
                parser.material_library(materials)?;
            }
            TokenKind::Identifier(_) => parser
                .directive()
                .map_err(|e| AssetError::format(path, e))?,
            _ => {
                let err = parser.tokens.unexpected("geometry directive");
                return Err(AssetError::format(path, err));
            }
        }
    }

    let model = parser.model;
    log::debug!(
        "Parsed {path}: {} mesh(es), {} triangle(s)",
        model.meshes.len(),
        model.triangle_count()
    );
    Ok(model)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Directive {
    Object,
    Vertex,
    Normal,
    TexCoord,
    UseMaterial,
    Smoothing,
    Group,
    Face,
}

impl Directive {
    fn parse(directive: &str) -> Option<Self> {
        Some(match directive {
            "o" => Self::Object,
            "v" => Self::Vertex,
            "vn" => Self::Normal,
            "vt" => Self::TexCoord,
            "usemtl" => Self::UseMaterial,
            "s" => Self::Smoothing,
            "g" => Self::Group,
            "f" => Self::Face,
            _ => return None,
        })
    }
}

struct ObjParser<'a> {
    path: &'a str,
    tokens: TokenStream<'a>,
    model: Model,
    /// Vertex position table of the current object.
    positions: Vec<Vec3>,
    /// Normal table of the whole file.
    normals: Vec<Vec3>,
    library: Option<Arc<MaterialLibrary>>,
}

impl ObjParser<'_> {
    fn material_library(&mut self, materials: &mut dyn MaterialSource) -> AssetResult<()> {
        let name = self
            .tokens
            .expect_name("material library file name")
            .map_err(|e| AssetError::format(self.path, e))?;
        let lib_path = path::resolve_sibling(self.path, name);
        log::debug!("{}: loading material library {lib_path}", self.path);

        self.library = Some(materials.material_library(&lib_path)?);
        self.model.material_library = Some(lib_path);
        Ok(())
    }

    fn directive(&mut self) -> Result<(), FormatError> {
        let token = self.tokens.advance();
        let (name, line) = (token.identifier().unwrap_or_default(), token.line);

        let directive = Directive::parse(name).ok_or_else(|| {
            FormatError::UnknownGeometryDirective {
                directive: name.to_owned(),
                line,
            }
        })?;
        if directive != Directive::Object && self.model.meshes.is_empty() {
            return Err(FormatError::PropertyBeforeObject {
                directive: name.to_owned(),
                line,
            });
        }

        match directive {
            Directive::Object => {
                let name = self.tokens.expect_identifier("object name")?;
                self.model.meshes.push(Mesh::new(name));
                self.positions.clear();
            }
            Directive::Vertex => {
                let v = self.vec3()?;
                self.positions.push(v);
            }
            Directive::Normal => {
                let n = self.vec3()?;
                self.normals.push(n);
            }
            Directive::TexCoord => {
                self.tokens.signed_number()?;
                self.tokens.signed_number()?;
                let next = self.tokens.current();
                if next.line == line && (next.number().is_some() || next.is_punct('-')) {
                    self.tokens.signed_number()?;
                }
            }
            Directive::UseMaterial => {
                let material_name = self.tokens.expect_identifier("material name")?;
                let material = self
                    .library
                    .as_ref()
                    .and_then(|lib| lib.get(material_name))
                    .cloned()
                    .ok_or_else(|| FormatError::UnknownMaterialName {
                        name: material_name.to_owned(),
                        line,
                    })?;
                self.current_mesh(name, line)?.material = Some(material);
            }
            Directive::Smoothing => match self.tokens.current().kind {
                TokenKind::Identifier(_) | TokenKind::Integer(_) => {
                    self.tokens.advance();
                }
                _ => return Err(self.tokens.unexpected("smoothing group")),
            },
            Directive::Group => self.tokens.skip_line(line),
            Directive::Face => self.face(line)?,
        }
        Ok(())
    }

    fn vec3(&mut self) -> Result<Vec3, FormatError> {
        let x = self.tokens.signed_number()?;
        let y = self.tokens.signed_number()?;
        let z = self.tokens.signed_number()?;
        Ok(Vec3::new(x, y, z))
    }

    /// `v/[vt]/vn` three times. Nothing is appended unless all corners resolve.
    fn face(&mut self, line: u32) -> Result<(), FormatError> {
        let mut positions = [Vec3::ZERO; 3];
        let mut normals = [Vec3::ZERO; 3];

        for (position, normal) in positions.iter_mut().zip(normals.iter_mut()) {
            let v = self.tokens.expect_integer("vertex index")?;
            self.tokens.expect_punct('/', "`/` after vertex index")?;
            if let TokenKind::Integer(_) = self.tokens.current().kind {
                self.tokens.advance();
            }
            self.tokens.expect_punct('/', "`/` before normal index")?;
            let vn = self.tokens.expect_integer("normal index")?;

            *position = lookup(&self.positions, v, line)?;
            *normal = lookup(&self.normals, vn, line)?;
        }

        let next = self.tokens.current();
        if next.line == line && !matches!(next.kind, TokenKind::CommentStart | TokenKind::End) {
            return Err(FormatError::FaceCornerCount { line });
        }

        self.current_mesh("f", line)?.push_triangle(positions, normals);
        Ok(())
    }

    fn current_mesh(&mut self, directive: &str, line: u32) -> Result<&mut Mesh, FormatError> {
        self.model
            .meshes
            .last_mut()
            .ok_or_else(|| FormatError::PropertyBeforeObject {
                directive: directive.to_owned(),
                line,
            })
    }
}

/// Resolve a 1-based index into `table`.
fn lookup(table: &[Vec3], index: u64, line: u32) -> Result<Vec3, FormatError> {
    index
        .checked_sub(1)
        .and_then(|i| usize::try_from(i).ok())
        .and_then(|i| table.get(i))
        .copied()
        .ok_or(FormatError::FaceIndexOutOfRange {
            index,
            len: table.len(),
            line,
        })
}
