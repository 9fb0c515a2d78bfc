//! Material library (`.mtl`) parser.

use corelib::Color;
use lexer::{TokenKind, Tokenizer};

use crate::{
    error::FormatError,
    mesh::{Material, MaterialLibrary},
    stream::TokenStream,
};

#[derive(Clone, Copy, Debug)]
enum Property {
    SpecularExponent,
    Transparency,
    Ambient,
    Diffuse,
    Specular,
    Emissive,
    /// `Ni`: validated, not stored.
    OpticalDensity,
    /// `illum`: validated, not stored.
    Illumination,
}

impl Property {
    fn from_directive(directive: &str) -> Option<Self> {
        Some(match directive {
            "Ns" => Self::SpecularExponent,
            "d" => Self::Transparency,
            "Ka" => Self::Ambient,
            "Kd" => Self::Diffuse,
            "Ks" => Self::Specular,
            "Ke" => Self::Emissive,
            "Ni" => Self::OpticalDensity,
            "illum" => Self::Illumination,
            _ => return None,
        })
    }
}

/// Parse the source of a material library. `path` is only used in diagnostics.
pub fn parse_mtl(src: &str, path: &str) -> Result<MaterialLibrary, FormatError> {
    let lexer = Tokenizer::new(src)
        .dots_in_identifiers(true)
        .with_error_hook(move |err| log::warn!("{path}:{err}"));
    let mut tokens = TokenStream::new(lexer);

    let mut library = MaterialLibrary::new();
    let mut current: Option<Material> = None;

    loop {
        let token = tokens.current();
        match token.kind {
            TokenKind::End => break,
            TokenKind::CommentStart => tokens.skip_line(token.line),
            TokenKind::Identifier("newmtl") => {
                tokens.advance();
                let name = tokens.expect_identifier("material name")?;
                if let Some(done) = current.replace(Material::new(name)) {
                    finish(&mut library, done, path);
                }
            }
            TokenKind::Identifier(directive) => {
                let property = Property::from_directive(directive).ok_or_else(|| {
                    FormatError::UnknownMaterialDirective {
                        directive: directive.to_owned(),
                        line: token.line,
                    }
                })?;
                let material =
                    current
                        .as_mut()
                        .ok_or_else(|| FormatError::PropertyBeforeMaterial {
                            directive: directive.to_owned(),
                            line: token.line,
                        })?;
                tokens.advance();

                match property {
                    Property::SpecularExponent => material.specular_exponent = tokens.expect_number()?,
                    Property::Transparency => material.transparency = tokens.expect_number()?,
                    Property::Ambient => material.ambient = color(&mut tokens)?,
                    Property::Diffuse => material.diffuse = color(&mut tokens)?,
                    Property::Specular => material.specular = color(&mut tokens)?,
                    Property::Emissive => material.emissive = color(&mut tokens)?,
                    Property::OpticalDensity | Property::Illumination => {
                        tokens.expect_number()?;
                    }
                }
            }
            _ => return Err(tokens.unexpected("material directive")),
        }
    }

    if let Some(done) = current {
        finish(&mut library, done, path);
    }

    log::debug!("Parsed material library {path}: {} material(s)", library.len());
    Ok(library)
}

fn finish(library: &mut MaterialLibrary, material: Material, path: &str) {
    let name = material.name.clone();
    if library.insert(material).is_some() {
        log::warn!("{path}: material `{name}` defined twice; keeping the last definition");
    }
}

/// Three unsigned float components.
fn color(tokens: &mut TokenStream<'_>) -> Result<Color, FormatError> {
    let r = tokens.expect_float()?;
    let g = tokens.expect_float()?;
    let b = tokens.expect_float()?;
    Ok(Color::new(r, g, b))
}
