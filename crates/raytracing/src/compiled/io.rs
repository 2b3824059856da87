//! Binary form of a `CompiledScene`.
//!
//! All values are big-endian. The name is a `u16` byte length followed by
//! UTF-8, every array an `i32` element count followed by its elements. Arrays
//! are written in a fixed order; `primitives_emitting_light` is an optional
//! trailing array, and a stream that ends cleanly before it simply lacks it.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::compiled::CompiledScene;
use crate::error::CompiledSceneError;

// initial capacity cap, so a corrupt length cannot trigger a huge allocation up front
const MAX_PREALLOCATED_ELEMENTS: usize = 1 << 16;

pub fn write_utf<W: Write>(writer: &mut W, value: &str) -> io::Result<()> {
    let len = u16::try_from(value.len()).map_err(|_| {
        io::Error::new(
            ErrorKind::InvalidInput,
            format!("name of {} bytes does not fit a u16 length", value.len()),
        )
    })?;
    writer.write_u16::<BigEndian>(len)?;
    writer.write_all(value.as_bytes())
}

pub fn read_utf<R: Read>(reader: &mut R) -> io::Result<String> {
    let len = reader.read_u16::<BigEndian>()? as usize;
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
}

fn write_len<W: Write>(writer: &mut W, len: usize) -> io::Result<()> {
    let len = i32::try_from(len)
        .map_err(|_| io::Error::new(ErrorKind::InvalidInput, format!("array of {len} elements is too long")))?;
    writer.write_i32::<BigEndian>(len)
}

fn check_len(len: i32) -> io::Result<usize> {
    usize::try_from(len).map_err(|_| io::Error::new(ErrorKind::InvalidData, format!("negative array length {len}")))
}

pub fn write_f32_array<W: Write>(writer: &mut W, values: &[f32]) -> io::Result<()> {
    write_len(writer, values.len())?;
    for &value in values {
        writer.write_f32::<BigEndian>(value)?;
    }
    Ok(())
}

pub fn write_i32_array<W: Write>(writer: &mut W, values: &[i32]) -> io::Result<()> {
    write_len(writer, values.len())?;
    for &value in values {
        writer.write_i32::<BigEndian>(value)?;
    }
    Ok(())
}

fn read_f32_elements<R: Read>(reader: &mut R, len: usize) -> io::Result<Vec<f32>> {
    let mut values = Vec::with_capacity(len.min(MAX_PREALLOCATED_ELEMENTS));
    for _ in 0..len {
        values.push(reader.read_f32::<BigEndian>()?);
    }
    Ok(values)
}

fn read_i32_elements<R: Read>(reader: &mut R, len: usize) -> io::Result<Vec<i32>> {
    let mut values = Vec::with_capacity(len.min(MAX_PREALLOCATED_ELEMENTS));
    for _ in 0..len {
        values.push(reader.read_i32::<BigEndian>()?);
    }
    Ok(values)
}

pub fn read_f32_array<R: Read>(reader: &mut R) -> io::Result<Vec<f32>> {
    let len = check_len(reader.read_i32::<BigEndian>()?)?;
    read_f32_elements(reader, len)
}

pub fn read_i32_array<R: Read>(reader: &mut R) -> io::Result<Vec<i32>> {
    let len = check_len(reader.read_i32::<BigEndian>()?)?;
    read_i32_elements(reader, len)
}

/// Like `read_i32_array`, but `None` if the stream ends before the length
fn read_optional_i32_array<R: Read>(reader: &mut R) -> io::Result<Option<Vec<i32>>> {
    let mut first = [0u8; 1];
    loop {
        match reader.read(&mut first) {
            Ok(0) => return Ok(None),
            Ok(_) => break,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    let mut rest = [0u8; 3];
    reader.read_exact(&mut rest)?;
    let len = check_len(i32::from_be_bytes([first[0], rest[0], rest[1], rest[2]]))?;
    read_i32_elements(reader, len).map(Some)
}

impl CompiledScene {
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), CompiledSceneError> {
        write_utf(writer, &self.name)?;
        write_f32_array(writer, &self.point2fs)?;
        write_f32_array(writer, &self.point3fs)?;
        write_f32_array(writer, &self.vector3fs)?;
        write_i32_array(writer, &self.planes)?;
        write_f32_array(writer, &self.spheres)?;
        write_f32_array(writer, &self.terrains)?;
        write_i32_array(writer, &self.triangles)?;
        write_i32_array(writer, &self.bounding_volume_hierarchies)?;
        write_f32_array(writer, &self.textures)?;
        write_f32_array(writer, &self.surfaces)?;
        write_i32_array(writer, &self.primitives)?;
        write_f32_array(writer, &self.primitives_object_to_world)?;
        write_f32_array(writer, &self.primitives_world_to_object)?;
        write_f32_array(writer, &self.camera)?;
        if let Some(lights) = &self.primitives_emitting_light {
            write_i32_array(writer, lights)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read<R: Read>(reader: &mut R) -> Result<CompiledScene, CompiledSceneError> {
        Ok(CompiledScene {
            name: read_utf(reader)?,
            point2fs: read_f32_array(reader)?,
            point3fs: read_f32_array(reader)?,
            vector3fs: read_f32_array(reader)?,
            planes: read_i32_array(reader)?,
            spheres: read_f32_array(reader)?,
            terrains: read_f32_array(reader)?,
            triangles: read_i32_array(reader)?,
            bounding_volume_hierarchies: read_i32_array(reader)?,
            textures: read_f32_array(reader)?,
            surfaces: read_f32_array(reader)?,
            primitives: read_i32_array(reader)?,
            primitives_object_to_world: read_f32_array(reader)?,
            primitives_world_to_object: read_f32_array(reader)?,
            camera: read_f32_array(reader)?,
            primitives_emitting_light: read_optional_i32_array(reader)?,
        })
    }

    /// Writes through a buffer; a failed write can leave a truncated file behind
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), CompiledSceneError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)
    }

    pub fn read_from_path(path: impl AsRef<Path>) -> Result<CompiledScene, CompiledSceneError> {
        let mut reader = BufReader::new(File::open(path)?);
        CompiledScene::read(&mut reader)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CompiledSceneError> {
        let mut bytes = Vec::new();
        self.write(&mut bytes)?;
        Ok(bytes)
    }
}
