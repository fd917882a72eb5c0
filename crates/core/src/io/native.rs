//! Native GeoTIFF reading/writing with the `tiff` crate
//!
//! Understands the subset of GeoTIFF written by common composite exporters:
//! pixel scale + tiepoint georeferencing, the EPSG code of the projected or
//! geographic CRS key, and the GDAL no-data tag.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const GT_MODEL_TYPE_KEY: u16 = 1024;
const GT_RASTER_TYPE_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

/// Options for writing GeoTIFF files
#[derive(Debug, Clone, Default)]
pub struct GeoTiffOptions {
    /// Write the GDAL no-data tag as `nan`
    pub nan_nodata: bool,
}

/// Read the first band of a GeoTIFF file into a Raster
pub fn read_geotiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_geotiff(file)
}

fn decode_geotiff<T, R>(reader: R) -> Result<Raster<T>>
where
    T: RasterElement,
    R: std::io::Read + std::io::Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let data: Vec<T> = match result {
        DecodingResult::F32(buf) => cast_all(&buf),
        DecodingResult::F64(buf) => cast_all(&buf),
        DecodingResult::U8(buf) => cast_all(&buf),
        DecodingResult::U16(buf) => cast_all(&buf),
        DecodingResult::I16(buf) => cast_all(&buf),
        DecodingResult::I32(buf) => cast_all(&buf),
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    let mut raster = Raster::from_vec(data, rows, cols)?;

    if let Ok(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }
    raster.set_crs(read_crs(&mut decoder));
    raster.set_nodata(read_nodata(&mut decoder));

    Ok(raster)
}

fn cast_all<S, T>(buf: &[S]) -> Vec<T>
where
    S: num_traits::NumCast + Copy,
    T: RasterElement,
{
    buf.iter()
        .map(|&v| num_traits::cast(v).unwrap_or(T::default_nodata()))
        .collect()
}

fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Result<GeoTransform> {
    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| Error::Other("No pixel scale tag".into()))?;

    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| Error::Other("No tiepoint tag".into()))?;

    if scale.len() >= 2 && tiepoint.len() >= 6 {
        // tiepoint: [I, J, K, X, Y, Z]; scale: [ScaleX, ScaleY, ScaleZ]
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        return Ok(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]));
    }

    Err(Error::Other("Cannot determine geotransform".into()))
}

/// CRS from the GeoKey directory, projected key first.
fn read_crs<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<CRS> {
    let keys = decoder
        .get_tag_u16_vec(Tag::GeoKeyDirectoryTag)
        .ok()?;
    // header is 4 shorts, then entries of (key, location, count, value)
    let entries: Vec<&[u16]> = keys.get(4..)?.chunks_exact(4).collect();
    let lookup = |wanted: u16| {
        entries
            .iter()
            .find(|e| e[0] == wanted && e[1] == 0)
            .map(|e| e[3])
    };
    match lookup(PROJECTED_CS_TYPE_KEY) {
        Some(code) => Some(CRS::projected(code as u32)),
        None => lookup(GEOGRAPHIC_TYPE_KEY).map(|code| CRS::geographic(code as u32)),
    }
}

/// GeoKey directory: model type, raster type and the EPSG key matching the
/// model type.
fn geokey_directory(crs: Option<&CRS>) -> Vec<u16> {
    let code = crs
        .and_then(|c| c.epsg().map(|code| (code, c.is_geographic())))
        .and_then(|(code, geographic)| u16::try_from(code).ok().map(|code| (code, geographic)));
    let (model_type, crs_key) = match code {
        Some((code, true)) => (MODEL_TYPE_GEOGRAPHIC, Some((GEOGRAPHIC_TYPE_KEY, code))),
        Some((code, false)) => (MODEL_TYPE_PROJECTED, Some((PROJECTED_CS_TYPE_KEY, code))),
        None => (MODEL_TYPE_PROJECTED, None),
    };

    let mut keys = vec![
        1, 1, 0, 2,
        GT_MODEL_TYPE_KEY, 0, 1, model_type,
        GT_RASTER_TYPE_KEY, 0, 1, RASTER_PIXEL_IS_AREA,
    ];
    if let Some((key, code)) = crs_key {
        keys[3] = 3;
        keys.extend_from_slice(&[key, 0, 1, code]);
    }
    keys
}

fn read_nodata<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let text = decoder
        .get_tag_ascii_string(Tag::GdalNodata)
        .ok()?;
    text.trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .parse::<f64>()
        .ok()
}

/// Write a Raster as a single-band 32-bit float GeoTIFF
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P, options: Option<GeoTiffOptions>) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    encode_geotiff(raster, BufWriter::new(file), options.unwrap_or_default())
}

fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W, options: GeoTiffOptions) -> Result<()>
where
    T: RasterElement,
    W: std::io::Write + std::io::Seek,
{
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();

    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    let gt = raster.transform();

    let scale = vec![gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, scale.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

    let tiepoint = vec![0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, tiepoint.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

    let geokeys = geokey_directory(raster.crs());
    image
        .encoder()
        .write_tag(Tag::GeoKeyDirectoryTag, geokeys.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;

    if options.nan_nodata {
        image
            .encoder()
            .write_tag(Tag::GdalNodata, "nan")
            .map_err(|e| Error::Other(format!("Cannot write nodata tag: {}", e)))?;
    }

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tiff::encoder::colortype::GrayI16;

    #[test]
    fn test_geotiff_file_roundtrip_keeps_meta() {
        let mut raster = Raster::from_vec(vec![0.1, f64::NAN, 0.5, 0.75, 0.2, 0.0], 2, 3).unwrap();
        raster.set_transform(GeoTransform::new(500_000.0, 3_600_000.0, 30.0, -30.0));
        raster.set_crs(Some(CRS::from_epsg(32652)));

        let tmp = tempfile::NamedTempFile::new().unwrap();
        write_geotiff(&raster, tmp.path(), Some(GeoTiffOptions { nan_nodata: true })).unwrap();
        let back: Raster<f64> = read_geotiff(tmp.path()).unwrap();

        assert_eq!(back.shape(), (2, 3));
        assert_relative_eq!(back.get(1, 0).unwrap(), 0.75, epsilon = 1e-6);
        assert!(back.get(0, 1).unwrap().is_nan());
        assert_relative_eq!(back.transform().origin_x, 500_000.0);
        assert_relative_eq!(back.transform().pixel_height, -30.0);
        assert_eq!(back.crs().and_then(|c| c.epsg()), Some(32652));
        assert!(back.nodata().map_or(false, f64::is_nan));
        assert!(!back.crs().map_or(true, CRS::is_geographic));
    }

    #[test]
    fn test_geographic_crs_written_with_geographic_keys() {
        let keys = geokey_directory(Some(&CRS::from_epsg(4326)));
        assert_eq!(
            keys,
            vec![1, 1, 0, 3, 1024, 0, 1, 2, 1025, 0, 1, 1, 2048, 0, 1, 4326]
        );
        let keys = geokey_directory(Some(&CRS::projected(32652)));
        assert_eq!(keys[7], 1);
        assert_eq!(&keys[12..], &[3072, 0, 1, 32652]);
        assert_eq!(geokey_directory(None).len(), 12);

        let mut raster = Raster::filled(2, 2, 0.5f64);
        raster.set_transform(GeoTransform::new(130.2, 32.8, 0.00025, -0.00025));
        raster.set_crs(Some(CRS::from_epsg(4326)));
        let tmp = tempfile::NamedTempFile::new().unwrap();
        write_geotiff(&raster, tmp.path(), None).unwrap();
        let back: Raster<f64> = read_geotiff(tmp.path()).unwrap();
        let crs = back.crs().unwrap();
        assert_eq!(crs.epsg(), Some(4326));
        assert!(crs.is_geographic());
        assert_relative_eq!(back.transform().origin_y, 32.8, epsilon = 1e-12);
    }

    #[test]
    fn test_integer_sentinel_read_as_nodata() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        {
            let file = File::create(tmp.path()).unwrap();
            let mut encoder = TiffEncoder::new(BufWriter::new(file)).unwrap();
            let mut image = encoder.new_image::<GrayI16>(3, 1).unwrap();
            image
                .encoder()
                .write_tag(Tag::ModelPixelScaleTag, &[30.0f64, 30.0, 0.0][..])
                .unwrap();
            image
                .encoder()
                .write_tag(Tag::ModelTiepointTag, &[0.0f64, 0.0, 0.0, 600_000.0, 3_650_000.0, 0.0][..])
                .unwrap();
            image.encoder().write_tag(Tag::GdalNodata, "-9999").unwrap();
            image.write_data(&[4500i16, -9999, 6200]).unwrap();
        }

        let raster: Raster<f64> = read_geotiff(tmp.path()).unwrap();
        assert_eq!(raster.nodata(), Some(-9999.0));
        assert_relative_eq!(raster.transform().origin_x, 600_000.0);
        assert_relative_eq!(raster.transform().pixel_width, 30.0);

        let plane = raster.to_f64_nan();
        assert_eq!(plane.get(0, 0).unwrap(), 4500.0);
        assert!(plane.get(0, 1).unwrap().is_nan());
        assert_eq!(plane.get(0, 2).unwrap(), 6200.0);
    }
}
