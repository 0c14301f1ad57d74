/// Wavefront OBJ reader: `v` and `f` records only
use nom::{
    bytes::complete::{take_till, take_till1},
    character::complete::{char, i64 as integer, space0, space1},
    combinator::{all_consuming, map, opt},
    multi::separated_list1,
    number::complete::float,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use crate::geometry::{Mesh, MeshError};
use crate::vector::Vec3f;

/// Parse OBJ text into a mesh.
///
/// Face tokens may carry texture/normal references (`7/3/2`, `7//2`); only
/// the position index is kept. Positive indices are 1-based, negative ones
/// count back from the most recent vertex. Other record kinds are ignored.
pub fn parse_obj(input: &str) -> Result<Mesh, MeshError> {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for (number, line) in input.lines().enumerate() {
        let line_number = number + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (body, keyword) =
            keyword(line).map_err(|_| parse_error(line_number, "missing record keyword"))?;
        match keyword {
            "v" => {
                let (_, position) = all_consuming(vertex_body)(body)
                    .map_err(|_| parse_error(line_number, "expected `v x y z [w]`"))?;
                vertices.push(position);
            }
            "f" => {
                let (_, refs) = all_consuming(face_body)(body)
                    .map_err(|_| parse_error(line_number, "expected `f i j k ...`"))?;
                if refs.len() < 3 {
                    return Err(parse_error(
                        line_number,
                        &format!("face has {} vertices, at least 3 are required", refs.len()),
                    ));
                }
                let face = refs
                    .into_iter()
                    .map(|r| resolve_index(r, vertices.len(), line_number))
                    .collect::<Result<Vec<_>, _>>()?;
                faces.push(face);
            }
            _ => {}
        }
    }

    Mesh::new(vertices, faces)
}

fn parse_error(line: usize, message: &str) -> MeshError {
    MeshError::Parse {
        line,
        message: message.to_string(),
    }
}

fn resolve_index(reference: i64, vertex_count: usize, line: usize) -> Result<usize, MeshError> {
    let resolved = match reference {
        0 => None,
        r if r > 0 => usize::try_from(r - 1).ok(),
        r => usize::try_from(vertex_count as i64 + r).ok(),
    };
    resolved.ok_or_else(|| parse_error(line, &format!("invalid vertex reference {}", reference)))
}

fn keyword(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace())(input)
}

fn vertex_body(input: &str) -> IResult<&str, Vec3f> {
    map(
        terminated(
            tuple((
                preceded(space1, float),
                preceded(space1, float),
                preceded(space1, float),
                opt(preceded(space1, float)),
            )),
            space0,
        ),
        |(x, y, z, _w)| Vec3f::new(x, y, z),
    )(input)
}

fn face_body(input: &str) -> IResult<&str, Vec<i64>> {
    terminated(preceded(space1, separated_list1(space1, face_vertex)), space0)(input)
}

// `i`, `i/t`, `i//n` or `i/t/n`
fn face_vertex(input: &str) -> IResult<&str, i64> {
    terminated(
        integer,
        opt(pair(char('/'), take_till(|c: char| c.is_whitespace()))),
    )(input)
}
