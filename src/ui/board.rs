use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::pango;
use gtk4::prelude::*;

use crate::game::GridSize;

pub const CELL_SIZE: i32 = 80;
pub const CELL_GAP: i32 = 3;
pub const MATCHED_MARK: &str = "✔️";

/// The clickable size×size grid. It only paints what it is told.
pub struct BoardView {
    grid: gtk::Grid,
    cells: Vec<gtk::Button>,
    faces: Rc<RefCell<Vec<String>>>,
}

impl BoardView {
    pub fn new(size: GridSize, on_click: impl Fn(usize) + 'static) -> Self {
        let side = size.get() as i32;
        let grid = gtk::Grid::new();
        grid.add_css_class("memory-board");
        grid.set_row_spacing(CELL_GAP as u32);
        grid.set_column_spacing(CELL_GAP as u32);
        grid.set_row_homogeneous(true);
        grid.set_column_homogeneous(true);
        grid.set_halign(gtk::Align::Center);
        grid.set_valign(gtk::Align::Center);

        let faces = Rc::new(RefCell::new(vec![String::new(); size.cells()]));
        let on_click = Rc::new(on_click);
        let mut cells = Vec::with_capacity(size.cells());

        for index in 0..size.cells() {
            let button = gtk::Button::builder()
                .css_classes(vec!["memory-cell"])
                .build();
            button.set_size_request(CELL_SIZE, CELL_SIZE);

            let drawing_area = gtk::DrawingArea::builder()
                .hexpand(true)
                .vexpand(true)
                .build();
            let faces_draw = faces.clone();
            drawing_area.set_draw_func(move |area, cr, width, height| {
                let faces = faces_draw.borrow();
                let Some(text) = faces.get(index) else {
                    return;
                };
                if text.is_empty() {
                    return;
                }

                cr.set_antialias(cairo::Antialias::Best);
                let layout = pangocairo::functions::create_layout(cr);
                let mut font_desc = pango::FontDescription::new();
                font_desc.set_family("Noto Color Emoji, Apple Color Emoji, Segoe UI Emoji, sans");
                let font_size = width.min(height) as f64 * 0.42;
                font_desc.set_size((font_size * pango::SCALE as f64) as i32);
                layout.set_font_description(Some(&font_desc));
                layout.set_text(text);

                #[allow(deprecated)]
                let fg = area.style_context().color();
                cr.set_source_rgba(
                    fg.red() as f64,
                    fg.green() as f64,
                    fg.blue() as f64,
                    fg.alpha() as f64,
                );

                let (text_width, text_height) = layout.pixel_size();
                cr.move_to(
                    (width as f64 - text_width as f64) / 2.0,
                    (height as f64 - text_height as f64) / 2.0,
                );
                pangocairo::functions::show_layout(cr, &layout);
            });
            button.set_child(Some(&drawing_area));

            let on_click = on_click.clone();
            button.connect_clicked(move |_| (*on_click)(index));

            let x = index as i32 % side;
            let y = index as i32 / side;
            grid.attach(&button, x, y, 1, 1);
            cells.push(button);
        }

        Self { grid, cells, faces }
    }

    pub fn widget(&self) -> &gtk::Grid {
        &self.grid
    }

    fn set_face(&self, position: usize, text: &str) {
        let Some(button) = self.cells.get(position) else {
            return;
        };
        if let Some(face) = self.faces.borrow_mut().get_mut(position) {
            face.clear();
            face.push_str(text);
        }
        if let Some(child) = button.child() {
            child.queue_draw();
        }
    }

    pub fn show_symbol(&self, position: usize, symbol: &str) {
        self.set_face(position, symbol);
        if let Some(button) = self.cells.get(position) {
            button.add_css_class("revealed");
        }
    }

    pub fn show_matched(&self, position: usize) {
        self.set_face(position, MATCHED_MARK);
        if let Some(button) = self.cells.get(position) {
            button.remove_css_class("revealed");
            button.add_css_class("matched");
        }
    }

    pub fn clear(&self, position: usize) {
        self.set_face(position, "");
        if let Some(button) = self.cells.get(position) {
            button.remove_css_class("revealed");
        }
    }
}
