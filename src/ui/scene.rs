use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;

use super::app::handle_cell_click;
use super::board::BoardView;
use super::hud::{moves_text, record_text, set_label, status_text};
use super::state::AppState;
use crate::game::{GridSize, RenderCommand};

fn rebuild_board(state: &Rc<RefCell<AppState>>, size: GridSize) {
    let state_click = state.clone();
    let view = BoardView::new(size, move |position| {
        handle_cell_click(&state_click, position);
    });

    let mut st = state.borrow_mut();
    if let Some(container) = &st.board_container {
        while let Some(child) = container.first_child() {
            container.remove(&child);
        }
        container.append(view.widget());
    }
    st.board = Some(view);
}

/// Executes render commands against the window. Must be called without an outstanding borrow.
pub(super) fn apply_commands(state: &Rc<RefCell<AppState>>, commands: &[RenderCommand]) {
    for command in commands {
        if let RenderCommand::BuildGrid { size } = command {
            rebuild_board(state, *size);
            continue;
        }

        let st = state.borrow();
        match command {
            RenderCommand::BuildGrid { .. } => {}
            RenderCommand::ShowSymbol { position, symbol } => {
                if let Some(board) = &st.board {
                    board.show_symbol(*position, symbol);
                }
            }
            RenderCommand::ShowMatched { position } => {
                if let Some(board) = &st.board {
                    board.show_matched(*position);
                }
            }
            RenderCommand::Clear { position } => {
                if let Some(board) = &st.board {
                    board.clear(*position);
                }
            }
            RenderCommand::SetMoves(moves) => {
                set_label(st.moves_label.as_ref(), &moves_text(*moves));
            }
            RenderCommand::SetStatus(status) => {
                set_label(st.status_label.as_ref(), status_text(*status));
            }
            RenderCommand::SetBest(best) => {
                set_label(st.record_label.as_ref(), &record_text(*best));
            }
        }
    }
}
