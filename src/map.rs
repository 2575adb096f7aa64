use std::fmt;
use std::path::Path;
use std::str::FromStr;

use clearpath_core::Segment;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: unknown keyword `{keyword}`")]
    UnknownKeyword { line: usize, keyword: String },
    #[error("line {line}: `{keyword}` expects {expected} values, got {found}")]
    Arity {
        line: usize,
        keyword: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid number `{token}`")]
    InvalidNumber { line: usize, token: String },
    #[error("unknown path finder type `{0}`")]
    UnknownType(String),
    #[error("path finder type `{0}` is not supported")]
    UnsupportedType(String),
    #[error("map is missing the `{0}` line")]
    Missing(&'static str),
}

/// Path finding strategies a map can ask for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FinderKind {
    RegularGrid,
}

impl fmt::Display for FinderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinderKind::RegularGrid => f.write_str("regular_grid"),
        }
    }
}

/// Parsed contents of a map file.
///
/// ```text
/// # comment
/// type regular_grid
/// resolution 10 10
/// dimensions 10.0 10.0
/// wall 5 0 5 7
/// ```
///
/// `type` and `resolution` are required. Without `dimensions`, cells are one unit wide.
#[derive(Clone, Debug, PartialEq)]
pub struct MapDescription {
    pub kind: FinderKind,
    pub res_x: i32,
    pub res_y: i32,
    pub dim_x: f32,
    pub dim_y: f32,
    pub walls: Vec<Segment>,
}

impl MapDescription {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, MapError> {
        std::fs::read_to_string(path)?.parse()
    }

    pub fn parse(text: &str) -> Result<Self, MapError> {
        let mut kind = None;
        let mut resolution = None;
        let mut dimensions = None;
        let mut walls = vec![];

        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            let content = line.split('#').next().unwrap_or_default();
            let mut tokens = content.split_whitespace();
            let Some(keyword) = tokens.next() else {
                continue;
            };
            let values: Vec<&str> = tokens.collect();

            match keyword {
                "type" => {
                    let [name] = fields(line_number, "type", &values)?;
                    kind = Some(match name {
                        "regular_grid" => FinderKind::RegularGrid,
                        "visibility_graph" => {
                            return Err(MapError::UnsupportedType(name.to_owned()))
                        }
                        _ => return Err(MapError::UnknownType(name.to_owned())),
                    });
                }
                "resolution" => {
                    let [x, y] = fields(line_number, "resolution", &values)?;
                    resolution = Some((number(line_number, x)?, number(line_number, y)?));
                }
                "dimensions" => {
                    let [x, y] = fields(line_number, "dimensions", &values)?;
                    dimensions = Some((number(line_number, x)?, number(line_number, y)?));
                }
                "wall" => {
                    let [x1, y1, x2, y2] = fields(line_number, "wall", &values)?;
                    walls.push(Segment::from_coords(
                        number(line_number, x1)?,
                        number(line_number, y1)?,
                        number(line_number, x2)?,
                        number(line_number, y2)?,
                    ));
                }
                _ => {
                    return Err(MapError::UnknownKeyword {
                        line: line_number,
                        keyword: keyword.to_owned(),
                    })
                }
            }
        }

        let kind = kind.ok_or(MapError::Missing("type"))?;
        let (res_x, res_y) = resolution.ok_or(MapError::Missing("resolution"))?;
        let (dim_x, dim_y) = dimensions.unwrap_or((res_x as f32, res_y as f32));

        Ok(MapDescription {
            kind,
            res_x,
            res_y,
            dim_x,
            dim_y,
            walls,
        })
    }
}

impl FromStr for MapDescription {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, MapError> {
        MapDescription::parse(s)
    }
}

fn fields<'a, const N: usize>(
    line: usize,
    keyword: &'static str,
    values: &[&'a str],
) -> Result<[&'a str; N], MapError> {
    values.try_into().map_err(|_| MapError::Arity {
        line,
        keyword,
        expected: N,
        found: values.len(),
    })
}

fn number<T: FromStr>(line: usize, token: &str) -> Result<T, MapError> {
    token.parse().map_err(|_| MapError::InvalidNumber {
        line,
        token: token.to_owned(),
    })
}
