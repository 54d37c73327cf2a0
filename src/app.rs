use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::TimeZone;
use eframe::{App, egui};
use egui::{Color32, RichText, TextEdit};

use crate::config::AiConfig;
use crate::media;
use crate::models::{
    AttachmentKind, AttachmentPatch, LineStyle, NotebookColor, NotebookSession, NotebookTheme,
    PagePatch, TextureStyle,
};
use crate::palette::{self, Swatch};
use crate::polish::{GeminiGenerator, PolishWorker};
use crate::session::{Library, PolishResolution, SaveStatus};

const PAGE_MAX_WIDTH: f32 = 800.0;
const PAGE_MIN_HEIGHT: f32 = 640.0;
const IMAGE_MAX_SIZE: egui::Vec2 = egui::vec2(200.0, 300.0);
const STICKY_WIDTH: f32 = 180.0;
const STATUS_REPAINT_MS: u64 = 100;
const INK: Color32 = Color32::from_rgb(0x37, 0x41, 0x51);
const STICKY_PAPER: Color32 = Color32::from_rgb(0xfe, 0xf3, 0xc7);
const STICKY_INK: Color32 = Color32::from_rgb(0x78, 0x35, 0x0f);

/// Everything the view can ask the library to do.
enum Intent {
    AddPage,
    PrevPage,
    NextPage,
    EditPage(PagePatch),
    AddSticky,
    ImportImage(PathBuf),
    PasteImage,
    MoveAttachment { id: String, x: f32, y: f32 },
    EditSticky { id: String, content: String },
    RemoveAttachment(String),
    SetTheme(NotebookTheme),
    Rename(String),
    Polish,
    SelectNotebook(String),
    DeleteNotebook(String),
    CreateNotebook,
}

/// UI-only state that never gets persisted.
#[derive(Default)]
struct ViewState {
    library_open: bool,
    theme_open: bool,
    image_path: String,
    status: Option<String>,
    /// Attachment being dragged and how far it has moved so far.
    drag: Option<(String, egui::Vec2)>,
    textures: HashMap<String, egui::TextureHandle>,
    broken_images: HashSet<String>,
}

pub struct NotebookApp {
    library: Library,
    polish: Option<PolishWorker>,
    view: ViewState,
}

impl NotebookApp {
    pub fn new(ctx: &egui::Context, library: Library, ai: &AiConfig) -> Self {
        let polish = match GeminiGenerator::new(ai) {
            Ok(generator) => Some(PolishWorker::spawn(ctx.clone(), Box::new(generator))),
            Err(err) => {
                tracing::warn!(error = %err, "AI polish disabled");
                None
            }
        };
        if ai.api_key.is_none() {
            tracing::info!("no Gemini API key configured; AI Magic will report an error");
        }

        Self {
            library,
            polish,
            view: ViewState::default(),
        }
    }

    fn apply_theme(&self, ctx: &egui::Context) {
        let colors = palette::swatch(self.library.active().theme.color);
        let mut visuals = egui::Visuals::light();
        visuals.panel_fill = Color32::from_rgb(0xff, 0xf5, 0xf8);
        visuals.window_fill = Color32::from_rgb(0xff, 0xfb, 0xfd);
        visuals.override_text_color = Some(INK);
        visuals.selection.bg_fill = colors.border;
        visuals.selection.stroke = egui::Stroke::new(1.0, colors.accent);
        visuals.window_rounding = egui::Rounding::same(24.0);
        ctx.set_visuals(visuals);

        let mut style = (*ctx.style()).clone();
        style
            .text_styles
            .insert(egui::TextStyle::Heading, egui::FontId::proportional(26.0));
        style
            .text_styles
            .insert(egui::TextStyle::Body, egui::FontId::proportional(16.0));
        style
            .text_styles
            .insert(egui::TextStyle::Small, egui::FontId::proportional(12.0));
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.button_padding = egui::vec2(10.0, 6.0);
        ctx.set_style(style);
    }

    fn report<T>(&mut self, action: &str, result: Result<T, impl std::fmt::Display>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(error = %err, action, "notebook action failed");
                self.view.status = Some(format!("Could not {action}: {err}"));
                None
            }
        }
    }

    fn apply_polish_outcomes(&mut self) {
        let Some(worker) = self.polish.as_ref() else {
            return;
        };
        let mut outcomes = Vec::new();
        let mut worker_gone = None;
        loop {
            match worker.try_recv() {
                Ok(Some(outcome)) => outcomes.push(outcome),
                Ok(None) => break,
                Err(err) => {
                    worker_gone = Some(err);
                    break;
                }
            }
        }

        for outcome in outcomes {
            match self.library.finish_polish(outcome) {
                Ok(PolishResolution::Applied) => self.view.status = None,
                Ok(PolishResolution::TargetMissing) => {
                    self.view.status =
                        Some("That page is gone, so the polished text was dropped.".to_string());
                }
                Ok(PolishResolution::Failed(err)) => {
                    self.view.status = Some(format!("AI Magic failed: {err}"));
                }
                Err(err) => {
                    self.report("save the polished page", Err::<(), _>(err));
                }
            }
        }

        if let Some(err) = worker_gone {
            tracing::warn!(error = %err, "AI polish worker stopped");
            self.polish = None;
            self.library.cancel_polish();
            self.view.status = Some(format!("AI Magic failed: {err}"));
        }
    }

    fn start_polish(&mut self) {
        let Some(request) = self.library.begin_polish() else {
            return;
        };
        let submitted = match self.polish.as_ref() {
            Some(worker) => worker.submit(request).map_err(|err| err.to_string()),
            None => Err("the AI helper is not available".to_string()),
        };
        if let Err(err) = submitted {
            self.library.cancel_polish();
            self.view.status = Some(format!("AI Magic failed: {err}"));
        }
    }

    fn import_image(&mut self, path: PathBuf) {
        let data_uri = media::image_file_to_data_uri(&path);
        if let Some(data_uri) = self.report("read that photo", data_uri) {
            let added = self.library.add_image(data_uri);
            if self.report("add the photo", added).is_some() {
                tracing::info!(path = %path.display(), "photo attached");
                self.view.status = None;
            }
        }
    }

    fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::AddPage => {
                let result = self.library.add_page();
                self.report("add a page", result);
            }
            Intent::PrevPage => self.library.prev_page(),
            Intent::NextPage => self.library.next_page(),
            Intent::EditPage(patch) => {
                let result = self.library.update_page(patch);
                self.report("save the page", result);
            }
            Intent::AddSticky => {
                let result = self.library.add_sticky();
                self.report("add a sticky note", result);
            }
            Intent::ImportImage(path) => self.import_image(path),
            Intent::PasteImage => {
                let data_uri = media::clipboard_image_to_data_uri();
                if let Some(data_uri) = self.report("paste a photo", data_uri) {
                    let added = self.library.add_image(data_uri);
                    self.report("add the photo", added);
                }
            }
            Intent::MoveAttachment { id, x, y } => {
                let result = self
                    .library
                    .update_attachment(&id, AttachmentPatch::position(x, y));
                self.report("move that decoration", result);
            }
            Intent::EditSticky { id, content } => {
                let patch = AttachmentPatch {
                    content: Some(content),
                    ..Default::default()
                };
                let result = self.library.update_attachment(&id, patch);
                self.report("save the sticky note", result);
            }
            Intent::RemoveAttachment(id) => {
                let result = self.library.remove_attachment(&id);
                self.report("remove that decoration", result);
            }
            Intent::SetTheme(theme) => {
                let result = self.library.set_theme(theme);
                self.report("change the theme", result);
            }
            Intent::Rename(name) => {
                let result = self.library.rename_active(name);
                self.report("rename the notebook", result);
            }
            Intent::Polish => self.start_polish(),
            Intent::SelectNotebook(id) => {
                self.library.select_notebook(&id);
                self.view.library_open = false;
            }
            Intent::DeleteNotebook(id) => {
                let result = self.library.delete_notebook(&id);
                self.report("delete the notebook", result);
            }
            Intent::CreateNotebook => {
                let result = self.library.create_notebook();
                self.report("create a notebook", result);
                self.view.library_open = false;
            }
        }
    }

    /// Decode photos for the active notebook once and drop textures nobody shows.
    fn sync_textures(&mut self, ctx: &egui::Context) {
        let notebook = self.library.active();
        let live: HashSet<&str> = notebook
            .attachments
            .iter()
            .filter(|a| a.kind == AttachmentKind::Image)
            .map(|a| a.id.as_str())
            .collect();
        self.view.textures.retain(|id, _| live.contains(id.as_str()));

        for attachment in &notebook.attachments {
            if attachment.kind != AttachmentKind::Image
                || self.view.textures.contains_key(&attachment.id)
                || self.view.broken_images.contains(&attachment.id)
            {
                continue;
            }
            match media::decode_data_uri(&attachment.content) {
                Ok(decoded) => {
                    let image = egui::ColorImage::from_rgba_unmultiplied(decoded.size, &decoded.rgba);
                    let texture = ctx.load_texture(
                        format!("attachment-{}", attachment.id),
                        image,
                        egui::TextureOptions::LINEAR,
                    );
                    self.view.textures.insert(attachment.id.clone(), texture);
                }
                Err(err) => {
                    tracing::warn!(id = %attachment.id, error = %err, "could not decode photo");
                    self.view.broken_images.insert(attachment.id.clone());
                }
            }
        }
    }
}

impl App for NotebookApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_polish_outcomes();
        self.apply_theme(ctx);
        self.sync_textures(ctx);

        let mut intents = Vec::new();
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        intents.extend(dropped.into_iter().map(Intent::ImportImage));

        let save_status = self.library.save_status(Instant::now());
        if matches!(save_status, SaveStatus::Saving | SaveStatus::Saved)
            || self.library.is_polishing()
        {
            ctx.request_repaint_after(Duration::from_millis(STATUS_REPAINT_MS));
        }

        let library = &self.library;
        let view = &mut self.view;

        egui::TopBottomPanel::top("toolbar")
            .frame(egui::Frame::none().inner_margin(egui::Margin::symmetric(16.0, 12.0)))
            .show(ctx, |ui| toolbar(ui, library, view, save_status, &mut intents));

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new(format!("♥ Currently Editing: {}", library.active().name))
                        .color(palette::swatch(library.active().theme.color).accent),
                );
                ui.label(RichText::new("Personal Notebook System").small().weak());
            });
        });

        let canvas = egui::CentralPanel::default()
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .show(ui, |ui| {
                        ui.vertical_centered(|ui| page_editor(ui, library, &mut intents))
                            .inner
                    })
                    .inner
            })
            .inner;

        attachments_overlay(ctx, library, view, canvas, &mut intents);

        if view.library_open {
            library_window(ctx, library, view, &mut intents);
        }
        if view.theme_open {
            theme_window(ctx, library.active().theme, view, &mut intents);
        }

        for intent in intents {
            self.apply(intent);
        }
    }
}

fn toolbar(
    ui: &mut egui::Ui,
    library: &Library,
    view: &mut ViewState,
    save_status: SaveStatus,
    intents: &mut Vec<Intent>,
) {
    let colors = palette::swatch(library.active().theme.color);
    egui::Frame::none()
        .fill(Color32::from_white_alpha(245))
        .rounding(egui::Rounding::same(28.0))
        .stroke(egui::Stroke::new(1.0, colors.border))
        .inner_margin(egui::Margin::symmetric(18.0, 8.0))
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                let books = egui::Button::new(RichText::new("📖 My Notebooks").strong().color(Color32::WHITE))
                    .fill(colors.accent)
                    .rounding(egui::Rounding::same(16.0));
                if ui.add(books).on_hover_text("See previous notes").clicked() {
                    view.library_open = true;
                }
                ui.separator();

                if ui.button("➕ New Page").clicked() {
                    intents.push(Intent::AddPage);
                }

                let path_field = ui.add(
                    TextEdit::singleline(&mut view.image_path)
                        .hint_text("photo path, or drop a file")
                        .desired_width(180.0),
                );
                let submitted = path_field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if (ui.button("🖼 Photo").clicked() || submitted) && !view.image_path.trim().is_empty() {
                    intents.push(Intent::ImportImage(PathBuf::from(view.image_path.trim())));
                    view.image_path.clear();
                }
                if ui.button("📋 Paste Photo").clicked() {
                    intents.push(Intent::PasteImage);
                }
                if ui.button("🗒 Sticky").clicked() {
                    intents.push(Intent::AddSticky);
                }

                let polishing = library.is_polishing();
                let magic_label = if polishing { "✨ Polishing..." } else { "✨ AI Magic" };
                if ui
                    .add_enabled(!polishing, egui::Button::new(magic_label))
                    .clicked()
                {
                    intents.push(Intent::Polish);
                }
                ui.separator();

                if ui.selectable_label(view.theme_open, "🎨 Theme").clicked() {
                    view.theme_open = !view.theme_open;
                }
                let icon = match save_status {
                    SaveStatus::Saving => "✨",
                    SaveStatus::Failed => "⚠",
                    _ => "💾",
                };
                ui.label(
                    RichText::new(format!("{icon} {}", save_status.label().to_uppercase()))
                        .small()
                        .strong()
                        .color(colors.accent),
                );
            });

            if let Some(status) = &view.status {
                ui.colored_label(Color32::from_rgb(0xe1, 0x1d, 0x48), status);
            }
        });
}

/// Draws the page and returns the top-left corner of the writing canvas.
fn page_editor(ui: &mut egui::Ui, library: &Library, intents: &mut Vec<Intent>) -> egui::Pos2 {
    let notebook = library.active();
    let page = library.current_page();
    let index = library.page_index();
    let total = notebook.pages.len();
    let theme = notebook.theme;
    let colors = palette::swatch(theme.color);
    let width = ui.available_width().min(PAGE_MAX_WIDTH);

    egui::Frame::none()
        .fill(colors.cover)
        .rounding(egui::Rounding::same(24.0))
        .stroke(egui::Stroke::new(10.0, Color32::WHITE))
        .shadow(egui::epaint::Shadow {
            offset: egui::vec2(0.0, 8.0),
            blur: 28.0,
            spread: 0.0,
            color: Color32::from_black_alpha(40),
        })
        .inner_margin(egui::Margin::same(20.0))
        .show(ui, |ui| {
            ui.set_width(width);
            ui.label(
                RichText::new("MY LOVELY NOTES")
                    .small()
                    .strong()
                    .color(colors.accent),
            );
            ui.add_space(6.0);

            page_header(ui, page.title.clone(), page.date.clone(), &page.id, colors, intents);
            ui.add_space(8.0);

            let size = egui::vec2(ui.available_width(), PAGE_MIN_HEIGHT);
            let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
            palette::paint_paper(ui.painter(), rect, theme);

            let mut content = page.content.clone();
            let editor = TextEdit::multiline(&mut content)
                .id_source(("page-content", page.id.as_str()))
                .frame(false)
                .font(egui::FontId::proportional(palette::body_font_size(theme.line_style)))
                .text_color(INK)
                .hint_text("Start writing...")
                .desired_width(rect.width() - 32.0);
            let response = ui.put(rect.shrink2(egui::vec2(16.0, 8.0)), editor);
            if response.changed() {
                intents.push(Intent::EditPage(PagePatch::content(content)));
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.add_enabled(index > 0, egui::Button::new("◀")).clicked() {
                    intents.push(Intent::PrevPage);
                }
                ui.label(
                    RichText::new(format!("PAGE {} OF {}", index + 1, total))
                        .small()
                        .strong()
                        .color(colors.accent),
                );
                if ui.add_enabled(index + 1 < total, egui::Button::new("▶")).clicked() {
                    intents.push(Intent::NextPage);
                }
            });

            rect.min
        })
        .inner
}

fn page_header(
    ui: &mut egui::Ui,
    mut title: String,
    mut date: String,
    page_id: &str,
    colors: Swatch,
    intents: &mut Vec<Intent>,
) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("Title:").strong().color(colors.accent));
        let title_edit = ui.add(
            TextEdit::singleline(&mut title)
                .id_source(("page-title", page_id))
                .hint_text("Magic Memories...")
                .font(egui::TextStyle::Heading)
                .frame(false)
                .desired_width(ui.available_width() - 180.0),
        );
        if title_edit.changed() {
            intents.push(Intent::EditPage(PagePatch {
                title: Some(title),
                ..Default::default()
            }));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let date_edit = ui.add(
                TextEdit::singleline(&mut date)
                    .id_source(("page-date", page_id))
                    .frame(false)
                    .desired_width(100.0),
            );
            if date_edit.changed() {
                intents.push(Intent::EditPage(PagePatch {
                    date: Some(date),
                    ..Default::default()
                }));
            }
            ui.label(RichText::new("Date:").strong().color(colors.accent));
        });
    });
}

fn attachments_overlay(
    ctx: &egui::Context,
    library: &Library,
    view: &mut ViewState,
    origin: egui::Pos2,
    intents: &mut Vec<Intent>,
) {
    for attachment in &library.active().attachments {
        let offset = match &view.drag {
            Some((id, delta)) if *id == attachment.id => *delta,
            _ => egui::Vec2::ZERO,
        };
        let pos = origin + egui::vec2(attachment.x, attachment.y) + offset;

        egui::Area::new(egui::Id::new(("attachment", attachment.id.as_str())))
            .fixed_pos(pos)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let handle = ui
                        .add(egui::Label::new(RichText::new("✥").size(16.0)).sense(egui::Sense::drag()))
                        .on_hover_cursor(egui::CursorIcon::Grab);
                    if handle.dragged() {
                        let moved = offset + handle.drag_delta();
                        view.drag = Some((attachment.id.clone(), moved));
                    }
                    if handle.drag_stopped() {
                        let moved = match &view.drag {
                            Some((id, delta)) if *id == attachment.id => *delta,
                            _ => offset,
                        };
                        intents.push(Intent::MoveAttachment {
                            id: attachment.id.clone(),
                            x: attachment.x + moved.x,
                            y: attachment.y + moved.y,
                        });
                        view.drag = None;
                    }
                    if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                        intents.push(Intent::RemoveAttachment(attachment.id.clone()));
                    }
                });

                match attachment.kind {
                    AttachmentKind::Image => {
                        egui::Frame::none()
                            .fill(Color32::WHITE)
                            .inner_margin(egui::Margin::same(8.0))
                            .shadow(egui::epaint::Shadow {
                                offset: egui::vec2(0.0, 4.0),
                                blur: 12.0,
                                spread: 0.0,
                                color: Color32::from_black_alpha(50),
                            })
                            .show(ui, |ui| match view.textures.get(&attachment.id) {
                                Some(texture) => {
                                    let mut size = texture.size_vec2();
                                    if let (Some(w), Some(h)) = (attachment.width, attachment.height) {
                                        size = egui::vec2(w, h);
                                    }
                                    let scale = (IMAGE_MAX_SIZE.x / size.x)
                                        .min(IMAGE_MAX_SIZE.y / size.y)
                                        .min(1.0);
                                    ui.add(egui::Image::new((texture.id(), size * scale)));
                                }
                                None => {
                                    ui.label(RichText::new("(photo unavailable)").italics().weak());
                                }
                            });
                    }
                    AttachmentKind::Sticky => {
                        egui::Frame::none()
                            .fill(STICKY_PAPER)
                            .inner_margin(egui::Margin::same(12.0))
                            .shadow(egui::epaint::Shadow {
                                offset: egui::vec2(0.0, 6.0),
                                blur: 14.0,
                                spread: 0.0,
                                color: Color32::from_black_alpha(45),
                            })
                            .show(ui, |ui| {
                                let mut text = attachment.content.clone();
                                let edit = ui.add(
                                    TextEdit::multiline(&mut text)
                                        .id_source(("sticky", attachment.id.as_str()))
                                        .frame(false)
                                        .text_color(STICKY_INK)
                                        .hint_text("Memo...")
                                        .desired_rows(4)
                                        .desired_width(STICKY_WIDTH),
                                );
                                if edit.changed() {
                                    intents.push(Intent::EditSticky {
                                        id: attachment.id.clone(),
                                        content: text,
                                    });
                                }
                            });
                    }
                }
            });
    }
}

fn updated_label(millis: i64) -> String {
    chrono::Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|at| at.format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn notebook_card(ui: &mut egui::Ui, notebook: &NotebookSession, active: bool, intents: &mut Vec<Intent>) {
    let colors = palette::swatch(notebook.theme.color);
    let (fill, stroke) = if active {
        (Color32::WHITE, egui::Stroke::new(2.0, colors.accent))
    } else {
        (Color32::from_white_alpha(220), egui::Stroke::new(1.0, colors.border))
    };

    egui::Frame::none()
        .fill(fill)
        .stroke(stroke)
        .rounding(egui::Rounding::same(24.0))
        .inner_margin(egui::Margin::same(16.0))
        .show(ui, |ui| {
            ui.set_width(200.0);
            ui.horizontal(|ui| {
                let (spine, _) = ui.allocate_exact_size(egui::vec2(36.0, 44.0), egui::Sense::hover());
                ui.painter().rect_filled(spine, 8.0, colors.spine);
                if active {
                    ui.label(RichText::new("♥").color(colors.accent));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                    if ui.small_button("🗑").on_hover_text("Delete Notebook").clicked() {
                        intents.push(Intent::DeleteNotebook(notebook.id.clone()));
                    }
                });
            });

            let name = if notebook.name.is_empty() {
                "Lovely Notebook"
            } else {
                notebook.name.as_str()
            };
            ui.label(RichText::new(name).strong().size(18.0));
            ui.label(
                RichText::new(format!("Last updated: {}", updated_label(notebook.updated_at)))
                    .small()
                    .color(colors.accent),
            );
            let pages = notebook.pages.len();
            ui.label(
                RichText::new(format!(
                    "{pages} {} · {} Decor",
                    if pages == 1 { "Page" } else { "Pages" },
                    notebook.attachments.len()
                ))
                .small()
                .strong(),
            );
            if !active && ui.button("Open").clicked() {
                intents.push(Intent::SelectNotebook(notebook.id.clone()));
            }
        });
}

fn library_window(ctx: &egui::Context, library: &Library, view: &mut ViewState, intents: &mut Vec<Intent>) {
    egui::Window::new("📚 Notebook Library")
        .open(&mut view.library_open)
        .collapsible(false)
        .resizable(true)
        .default_width(720.0)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("Access your previous notes and manage your collection").weak());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("➕ Start New Note").clicked() {
                        intents.push(Intent::CreateNotebook);
                    }
                });
            });

            ui.horizontal(|ui| {
                ui.label("Rename current notebook:");
                let mut name = library.active().name.clone();
                let edit = ui.add(
                    TextEdit::singleline(&mut name)
                        .id_source(("notebook-name", library.active_id()))
                        .desired_width(240.0),
                );
                if edit.changed() {
                    intents.push(Intent::Rename(name));
                }
            });
            ui.separator();

            egui::ScrollArea::vertical().max_height(480.0).show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for notebook in library.notebooks() {
                        notebook_card(ui, notebook, notebook.id == library.active_id(), intents);
                    }
                });
            });

            ui.separator();
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new(format!(
                        "💾 Your notes are auto-saved here · Total Notebooks: {}",
                        library.notebooks().len()
                    ))
                    .small(),
                );
            });
        });
}

fn color_name(color: NotebookColor) -> &'static str {
    match color {
        NotebookColor::Pink => "Pink",
        NotebookColor::Mint => "Mint",
        NotebookColor::Lavender => "Lavender",
        NotebookColor::Lemon => "Lemon",
        NotebookColor::Sky => "Sky",
    }
}

fn theme_window(ctx: &egui::Context, theme: NotebookTheme, view: &mut ViewState, intents: &mut Vec<Intent>) {
    let mut next = theme;
    egui::Window::new("🎨 Theme Magic")
        .open(&mut view.theme_open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-24.0, 96.0))
        .show(ctx, |ui| {
            ui.label(RichText::new("NOTEBOOK COLOR").small().strong());
            ui.horizontal(|ui| {
                for color in NotebookColor::ALL {
                    let fill = palette::swatch(color).spine;
                    let mark = if theme.color == color { "✔" } else { " " };
                    let button = egui::Button::new(RichText::new(mark).color(Color32::WHITE))
                        .fill(fill)
                        .rounding(egui::Rounding::same(14.0))
                        .min_size(egui::vec2(28.0, 28.0));
                    if ui.add(button).on_hover_text(color_name(color)).clicked() {
                        next.color = color;
                    }
                }
            });

            ui.add_space(8.0);
            ui.label(RichText::new("LINE STYLE").small().strong());
            ui.horizontal_wrapped(|ui| {
                for style in LineStyle::ALL {
                    if ui.selectable_label(theme.line_style == style, style.label()).clicked() {
                        next.line_style = style;
                    }
                }
            });

            ui.add_space(8.0);
            ui.label(RichText::new("PAPER TEXTURE").small().strong());
            ui.horizontal(|ui| {
                for texture in TextureStyle::ALL {
                    if ui.selectable_label(theme.texture == texture, texture.label()).clicked() {
                        next.texture = texture;
                    }
                }
            });

            ui.add_space(6.0);
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("* Every dream is unique! *").italics().weak());
            });
        });

    if next != theme {
        intents.push(Intent::SetTheme(next));
    }
}
