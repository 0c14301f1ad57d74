/// STL reader for binary and ASCII files
///
/// Stored facet normals are discarded; shading recomputes them from the
/// vertex winding.
use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::{count, many0},
    number::complete::{float, le_f32, le_u16, le_u32},
    sequence::{preceded, tuple},
    IResult,
};

use crate::geometry::{Mesh, MeshError, Triangle};
use crate::vector::Vec3f;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, MeshError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(MeshError::Malformed("file too small to be a binary STL".into()));
    }

    let (body, facet_count) = preceded(take(HEADER_LEN), le_u32::<_, nom::error::Error<_>>)(data)
        .map_err(|_| MeshError::Malformed("unreadable STL header".into()))?;
    let facet_count = facet_count as usize;
    if body.len() < facet_count * FACET_LEN {
        return Err(MeshError::Malformed(format!(
            "header declares {} facets but only {} bytes follow",
            facet_count,
            body.len()
        )));
    }

    let (_, triangles) = count(binary_facet, facet_count)(body)
        .map_err(|_| MeshError::Malformed("truncated facet data".into()))?;
    Ok(Mesh::from_triangles(triangles))
}

fn binary_vec3(input: &[u8]) -> IResult<&[u8], Vec3f> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Vec3f::new(x, y, z)))
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    let (input, _normal) = binary_vec3(input)?;
    let (input, (v0, v1, v2)) = tuple((binary_vec3, binary_vec3, binary_vec3))(input)?;
    let (input, _attributes) = le_u16(input)?;
    Ok((input, Triangle::new(v0, v1, v2)))
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, MeshError> {
    match ascii_solid(input) {
        Ok((_, triangles)) => Ok(Mesh::from_triangles(triangles)),
        Err(e) => Err(MeshError::Malformed(format!("invalid ASCII STL: {:?}", e))),
    }
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(multispace0, tag(word))
}

fn ascii_solid(input: &str) -> IResult<&str, Vec<Triangle>> {
    let (input, _) = keyword("solid")(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, triangles) = many0(ascii_facet)(input)?;
    let (input, _) = keyword("endsolid")(input)?;
    Ok((input, triangles))
}

fn ascii_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = keyword("facet")(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = ascii_vec3(input)?;
    let (input, _) = keyword("outer")(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v0) = ascii_vertex(input)?;
    let (input, v1) = ascii_vertex(input)?;
    let (input, v2) = ascii_vertex(input)?;
    let (input, _) = keyword("endloop")(input)?;
    let (input, _) = keyword("endfacet")(input)?;
    Ok((input, Triangle::new(v0, v1, v2)))
}

fn ascii_vertex(input: &str) -> IResult<&str, Vec3f> {
    preceded(keyword("vertex"), ascii_vec3)(input)
}

fn ascii_vec3(input: &str) -> IResult<&str, Vec3f> {
    let (input, (x, y, z)) = tuple((
        preceded(multispace1, float),
        preceded(multispace1, float),
        preceded(multispace1, float),
    ))(input)?;
    Ok((input, Vec3f::new(x, y, z)))
}

/// Detect the STL flavour and parse it.
///
/// Binary files may also start with `solid`, so a failed ASCII parse falls
/// back to the binary reader.
pub fn parse_stl(data: &[u8]) -> Result<Mesh, MeshError> {
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(mesh) = parse_ascii_stl(text) {
                return Ok(mesh);
            }
        }
    }
    parse_binary_stl(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_stl(triangles: &[[f32; 9]]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for triangle in triangles {
            data.extend_from_slice(&[0u8; 12]);
            for value in triangle {
                data.extend_from_slice(&value.to_le_bytes());
            }
            data.extend_from_slice(&0u16.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_parse_binary_header_only() {
        let mesh = parse_binary_stl(&binary_stl(&[])).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_parse_binary_facets() {
        let data = binary_stl(&[
            [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 1.0],
        ]);
        let mesh = parse_stl(&data).unwrap();
        assert_eq!(mesh.triangles().len(), 2);
        assert_eq!(mesh.vertices().len(), 6);
        assert_eq!(mesh.triangles()[1].vertices[2], Vec3f::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn test_truncated_binary_is_rejected() {
        let mut data = binary_stl(&[[0.0; 9]]);
        data.truncate(data.len() - 10);
        assert!(matches!(parse_binary_stl(&data), Err(MeshError::Malformed(_))));
        assert!(matches!(parse_binary_stl(&[0u8; 12]), Err(MeshError::Malformed(_))));
    }

    #[test]
    fn test_parse_ascii() {
        let text = "solid wedge
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid wedge
";
        let mesh = parse_stl(text.as_bytes()).unwrap();
        assert_eq!(mesh.triangles().len(), 1);
        assert_eq!(mesh.triangles()[0].vertices[1], Vec3f::new(1.0, 0.0, 0.0));
    }
}
