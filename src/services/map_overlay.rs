//! 地图标注 - 业务能力层
//!
//! 在地图图片上绘制距离标签、起终点地址与产生时间，
//! 合成后压平为不透明图片覆盖原文件。

use std::path::Path;

use ab_glyph::{FontArc, FontVec, PxScale};
use chrono::{DateTime, Local};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, RenderError};

/// 常见的中文字体位置
const FONT_CANDIDATES: [&str; 7] = [
    "C:/Windows/Fonts/msjh.ttc",
    "C:/Windows/Fonts/simsun.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
];

/// 找不到系统字体时使用的内建字体（只含拉丁字符）
const BUILTIN_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

const BADGE_SCALE: f32 = 24.0;
const FOOTER_SCALE: f32 = 16.0;
const PADDING: u32 = 12;
const MARGIN: u32 = 20;
const LINE_SPACING: u32 = 6;
const SHADOW_OFFSET: i32 = 3;

const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
const BADGE_COLOR: Rgba<u8> = Rgba([255, 255, 255, 230]);
const SHADOW_COLOR: Rgba<u8> = Rgba([120, 120, 120, 110]);
const FOOTER_COLOR: Rgba<u8> = Rgba([255, 255, 255, 200]);
const TIMESTAMP_COLOR: Rgba<u8> = Rgba([90, 90, 90, 255]);

/// 要标注在地图上的文字
#[derive(Debug, Clone)]
pub struct OverlayText {
    pub distance_km: f64,
    pub duration_text: Option<String>,
    pub origin_address: String,
    pub destination_address: String,
    pub generated_at: DateTime<Local>,
}

impl OverlayText {
    /// 距离标签的各行
    pub fn badge_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(duration) = self.duration_text.as_deref().filter(|d| !d.is_empty()) {
            lines.push(duration.to_string());
        }
        lines.push(format!("{} 公里", format_distance(self.distance_km)));
        lines
    }

    pub fn timestamp_line(&self) -> String {
        format!("产生时间 {}", self.generated_at.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// 地图标注器
#[derive(Clone, Debug)]
pub struct MapOverlay {
    font: Option<FontArc>,
}

impl MapOverlay {
    /// 加载字体，先使用指定路径，再依序尝试常见字体，最后使用内建字体
    pub fn load(font_path: Option<&str>) -> Self {
        let candidates = font_path.into_iter().chain(FONT_CANDIDATES);
        for candidate in candidates {
            let Ok(bytes) = std::fs::read(candidate) else {
                continue;
            };
            match Self::from_bytes(bytes) {
                Ok(overlay) => {
                    debug!("使用字体: {}", candidate);
                    return overlay;
                }
                Err(e) => debug!("字体无法使用 {}: {}", candidate, e),
            }
        }

        warn!("⚠️ 找不到系统中文字体，使用内建字体标注");
        Self::builtin()
    }

    /// 从字体文件内容建立，`.ttc` 取第一个字体
    pub fn from_bytes(bytes: Vec<u8>) -> AppResult<Self> {
        let font = FontVec::try_from_vec_and_index(bytes, 0).map_err(|e| {
            RenderError::InvalidFont {
                source: Box::new(e),
            }
        })?;
        Ok(Self {
            font: Some(FontArc::new(font)),
        })
    }

    /// 使用内建字体
    pub fn builtin() -> Self {
        match FontArc::try_from_slice(BUILTIN_FONT) {
            Ok(font) => Self { font: Some(font) },
            Err(e) => {
                warn!("⚠️ 内建字体无法解析，地图将不加标注: {}", e);
                Self::without_font()
            }
        }
    }

    /// 不加标注
    pub fn without_font() -> Self {
        Self { font: None }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// 在图片上绘制标注并覆盖原文件
    ///
    /// 解码、绘制与编码都是同步运算，异步调用方应放到阻塞线程执行
    ///
    /// # 参数
    /// - `path`: 已经保存的地图图片
    /// - `text`: 标注内容
    pub fn annotate(&self, path: &Path, text: &OverlayText) -> AppResult<()> {
        let font = self.font.as_ref().ok_or(RenderError::FontUnavailable)?;

        let mut base = image::open(path)
            .map_err(|e| AppError::image_failed(path, e))?
            .to_rgba8();
        let (width, height) = base.dimensions();

        let mut layer = RgbaImage::new(width, height);
        draw_badge(&mut layer, font, &text.badge_lines());
        draw_footer(&mut layer, font, text);

        image::imageops::overlay(&mut base, &layer, 0, 0);

        DynamicImage::ImageRgb8(flatten_onto_white(&base))
            .save(path)
            .map_err(|e| AppError::image_failed(path, e))?;

        info!("🖍️ 地图标注完成: {}", path.display());
        Ok(())
    }
}

/// 左上角的距离标签
fn draw_badge(layer: &mut RgbaImage, font: &FontArc, lines: &[String]) {
    let scale = PxScale::from(BADGE_SCALE);
    let sizes: Vec<(u32, u32)> = lines.iter().map(|l| text_size(scale, font, l)).collect();

    let inner_width = sizes.iter().map(|(w, _)| *w).max().unwrap_or(0);
    let inner_height: u32 = sizes.iter().map(|(_, h)| *h).sum::<u32>()
        + LINE_SPACING * (lines.len().saturating_sub(1) as u32);
    let box_width = inner_width + PADDING * 2;
    let box_height = inner_height + PADDING * 2;

    let x = MARGIN as i32;
    let y = MARGIN as i32;
    draw_filled_rect_mut(
        layer,
        Rect::at(x + SHADOW_OFFSET, y + SHADOW_OFFSET).of_size(box_width, box_height),
        SHADOW_COLOR,
    );
    draw_filled_rect_mut(layer, Rect::at(x, y).of_size(box_width, box_height), BADGE_COLOR);

    let mut cursor_y = y + PADDING as i32;
    for (line, (line_width, line_height)) in lines.iter().zip(&sizes) {
        let text_x = x + ((box_width - line_width) / 2) as i32;
        draw_text_mut(layer, TEXT_COLOR, text_x, cursor_y, scale, font, line);
        cursor_y += (line_height + LINE_SPACING) as i32;
    }
}

/// 底部的地址说明带与右下角的产生时间
fn draw_footer(layer: &mut RgbaImage, font: &FontArc, text: &OverlayText) {
    let (width, height) = layer.dimensions();
    let scale = PxScale::from(FOOTER_SCALE);
    let measure = |s: &str| text_size(scale, font, s).0;
    let max_width = width.saturating_sub(PADDING * 2).max(1);

    let mut lines = wrap_text(&format!("起点: {}", text.origin_address), max_width, measure);
    lines.extend(wrap_text(
        &format!("终点: {}", text.destination_address),
        max_width,
        measure,
    ));

    let line_height = text_size(scale, font, "起点").1.max(FOOTER_SCALE as u32);
    let timestamp = text.timestamp_line();
    let rows = lines.len() as u32 + 1;
    let band_height = (rows * line_height + (rows - 1) * LINE_SPACING + PADDING * 2).min(height);
    let band_top = height - band_height;

    draw_filled_rect_mut(
        layer,
        Rect::at(0, band_top as i32).of_size(width.max(1), band_height.max(1)),
        FOOTER_COLOR,
    );

    let mut cursor_y = (band_top + PADDING) as i32;
    for line in &lines {
        draw_text_mut(layer, TEXT_COLOR, PADDING as i32, cursor_y, scale, font, line);
        cursor_y += (line_height + LINE_SPACING) as i32;
    }

    let timestamp_width = measure(&timestamp);
    let timestamp_x = width.saturating_sub(timestamp_width + PADDING) as i32;
    draw_text_mut(layer, TIMESTAMP_COLOR, timestamp_x, cursor_y, scale, font, &timestamp);
}

/// 依宽度逐字换行，适用于没有空白分隔的中文地址
pub fn wrap_text(text: &str, max_width: u32, measure: impl Fn(&str) -> u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if measure(&current) > max_width && current.chars().count() > 1 {
            current.pop();
            lines.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// 整数距离不显示小数，否则保留一位小数
pub fn format_distance(km: f64) -> String {
    if km.fract() == 0.0 {
        format!("{}", km as i64)
    } else {
        format!("{:.1}", km)
    }
}

/// 把带透明度的图片合成到白色背景上
pub fn flatten_onto_white(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
        let alpha = u32::from(a);
        let blend = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}
