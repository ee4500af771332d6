//! Parser for the text polygon mesh format.
//!
//! The file is an ASCII header terminated by a literal `end_header`
//! line, with `element vertex <N>` and `element face <N>` declarations
//! setting the expected counts, followed by N vertex lines of
//! space-separated floats and N face lines of `3 i0 i1 i2`. Vertex
//! attribute groups after the position are optional and consumed
//! greedily in the order normal, uv, color.

use std::fs;
use std::path::Path;

use nom::{
    character::complete::{alpha1, multispace0, multispace1, u32 as decimal},
    bytes::complete::tag,
    multi::many0,
    number::complete::float,
    sequence::preceded,
    IResult,
};

use crate::error::{ViewerError, ViewerResult};
use crate::primitives::mesh::MeshData;
use crate::primitives::vertex::Vertex;

const END_HEADER: &str = "end_header";

fn element_decl(input: &str) -> IResult<&str, (&str, usize)> {
    let (input, _) = preceded(multispace0, tag("element"))(input)?;
    let (input, kind) = preceded(multispace1, alpha1)(input)?;
    let (input, count) = preceded(multispace1, decimal)(input)?;
    Ok((input, (kind, count as usize)))
}

fn float_fields(input: &str) -> IResult<&str, Vec<f32>> {
    many0(preceded(multispace0, float))(input)
}

fn face_line(input: &str) -> IResult<&str, (u32, [u32; 3])> {
    let (input, arity) = preceded(multispace0, decimal)(input)?;
    let (input, a) = preceded(multispace1, decimal)(input)?;
    let (input, b) = preceded(multispace1, decimal)(input)?;
    let (input, c) = preceded(multispace1, decimal)(input)?;
    Ok((input, (arity, [a, b, c])))
}

/// Parse a complete mesh file already read into memory.
pub fn parse_ply(input: &str) -> ViewerResult<MeshData> {
    let mut lines = input.lines();

    let mut vertex_count = 0usize;
    let mut face_count = 0usize;
    let mut saw_end_header = false;
    for line in &mut lines {
        if line.trim() == END_HEADER {
            saw_end_header = true;
            break;
        }
        if let Ok((_, (kind, count))) = element_decl(line) {
            match kind {
                "vertex" => vertex_count = count,
                "face" => face_count = count,
                _ => {}
            }
        }
    }
    if !saw_end_header {
        return Err(ViewerError::format("missing end_header"));
    }

    let mut vertices = Vec::with_capacity(vertex_count);
    for i in 0..vertex_count {
        let line = lines.next().ok_or_else(|| {
            ViewerError::format(format!(
                "truncated mesh file: expected {} vertices, found {}",
                vertex_count, i
            ))
        })?;
        let fields = match float_fields(line) {
            Ok((_, fields)) => fields,
            Err(_) => Vec::new(),
        };
        if fields.len() < 3 {
            return Err(ViewerError::format(format!(
                "vertex line {} has fewer than 3 position coordinates",
                i
            )));
        }
        vertices.push(Vertex::from_fields(&fields));
    }

    let mut triangles = Vec::with_capacity(face_count);
    for i in 0..face_count {
        let line = lines.next().ok_or_else(|| {
            ViewerError::format(format!(
                "truncated mesh file: expected {} faces, found {}",
                face_count, i
            ))
        })?;
        let (arity, indices) = match face_line(line) {
            Ok((_, parsed)) => parsed,
            Err(_) => {
                return Err(ViewerError::format(format!("malformed face line {}", i)));
            }
        };
        if arity != 3 {
            return Err(ViewerError::format(format!(
                "face {} has {} vertices, only triangles are supported",
                i, arity
            )));
        }
        for &index in indices.iter() {
            if index as usize >= vertices.len() {
                return Err(ViewerError::format(format!(
                    "face {} index {} out of range for {} vertices",
                    i,
                    index,
                    vertices.len()
                )));
            }
        }
        triangles.push(indices);
    }

    Ok(MeshData {
        vertices,
        triangles,
    })
}

/// Read and parse a mesh file from disk.
pub fn load_ply(path: &Path) -> ViewerResult<MeshData> {
    let text = fs::read_to_string(path).map_err(|source| ViewerError::io(path, source))?;
    parse_ply(&text).map_err(|err| err.with_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(vertices: usize, faces: usize) -> String {
        format!(
            "ply\nformat ascii 1.0\nelement vertex {}\nproperty float x\nelement face {}\nend_header\n",
            vertices, faces
        )
    }

    #[test]
    fn position_only_vertices_have_zeroed_attributes() {
        let file = format!("{}0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n", header(3, 1));
        let mesh = parse_ply(&file).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        for vertex in &mesh.vertices {
            assert_eq!(vertex.normal, [0.0; 3]);
            assert_eq!(vertex.uv, [0.0; 2]);
            assert_eq!(vertex.color, [0.0; 3]);
        }
    }

    #[test]
    fn full_vertices_round_trip() {
        let file = format!(
            "{}\
             0.5 -1.25 3 0 1 0 0.25 0.75 0.9 0.8 0.7\n\
             1 2 3 1 0 0 0.5 0.5 0.1 0.2 0.3\n\
             -1 -2 -3 0 0 1 0 1 0.4 0.5 0.6\n\
             3 0 1 2\n",
            header(3, 1)
        );
        let first = parse_ply(&file).unwrap();

        // Re-serialize in the same layout and parse again.
        let mut rewritten = header(first.vertex_count(), first.triangle_count());
        for v in &first.vertices {
            rewritten.push_str(&format!(
                "{} {} {} {} {} {} {} {} {} {} {}\n",
                v.position[0], v.position[1], v.position[2],
                v.normal[0], v.normal[1], v.normal[2],
                v.uv[0], v.uv[1],
                v.color[0], v.color[1], v.color[2],
            ));
        }
        for t in &first.triangles {
            rewritten.push_str(&format!("3 {} {} {}\n", t[0], t[1], t[2]));
        }
        let second = parse_ply(&rewritten).unwrap();

        assert_eq!(first.vertices, second.vertices);
        assert_eq!(first.triangles, second.triangles);
    }

    #[test]
    fn missing_end_header_is_rejected() {
        let err = parse_ply("ply\nelement vertex 1\n").unwrap_err();
        assert!(format!("{}", err).contains("end_header"));
    }

    #[test]
    fn truncated_vertex_section_is_rejected() {
        let file = format!("{}0 0 0\n", header(3, 0));
        let err = parse_ply(&file).unwrap_err();
        assert!(format!("{}", err).contains("truncated"));
    }

    #[test]
    fn truncated_face_section_is_rejected() {
        let file = format!("{}0 0 0\n1 0 0\n0 1 0\n", header(3, 2));
        let err = parse_ply(&file).unwrap_err();
        assert!(format!("{}", err).contains("truncated"));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let file = format!("{}0 0 0\n1 0 0\n0 1 0\n3 0 1 3\n", header(3, 1));
        let err = parse_ply(&file).unwrap_err();
        assert!(format!("{}", err).contains("out of range"));
    }

    #[test]
    fn non_triangle_face_is_rejected() {
        let file = format!("{}0 0 0\n1 0 0\n0 1 0\n4 0 1 2\n", header(3, 1));
        let err = parse_ply(&file).unwrap_err();
        assert!(format!("{}", err).contains("triangles"));
    }

    #[test]
    fn short_position_is_rejected() {
        let file = format!("{}0 0\n", header(1, 0));
        assert!(parse_ply(&file).is_err());
    }

    #[test]
    fn unknown_header_lines_are_ignored() {
        let file = "ply\ncomment made by nobody\nelement vertex 1\nelement face 0\n\
                    property float x\nend_header\n1 2 3\n";
        let mesh = parse_ply(file).unwrap();
        assert_eq!(mesh.vertices[0].position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn zero_counts_give_empty_mesh() {
        let mesh = parse_ply("ply\nend_header\n").unwrap();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }
}
