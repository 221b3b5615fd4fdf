// src/map/navmesh.rs
// Console script that walks the in-game nav editor through the generated map.

use log::{debug, warn};

use crate::document::{Document, Node};

pub const MARKER_CLASS: &str = "info_null";
const BIND_KEY: &str = "KP_PLUS";

fn markers<'a>(document: &'a Document, targetname: &str) -> Vec<&'a Node> {
    document.root.find_recurse(|n| {
        n.name == "entity" && n.has_classname(MARKER_CLASS) && n.targetname() == Some(targetname)
    })
}

fn setpos(marker: &Node) -> String {
    format!("setpos {}", marker.get("origin").unwrap_or("0 0 0"))
}

/// Marks the area spanned by two corner markers with `attribute`.
fn attribute_area(lines: &mut Vec<Vec<String>>, corners: &[&Node], attribute: &str) {
    lines.push(vec![
        "nav_clear_selected_set".into(),
        setpos(corners[0]),
        "setang 90 0 0".into(),
    ]);
    lines.push(vec![
        "nav_begin_area".into(),
        setpos(corners[1]),
        "setang 90 0 0".into(),
    ]);
    lines.push(vec![
        "nav_end_area".into(),
        "nav_toggle_in_selected_set".into(),
        format!("mark {}", attribute),
        "nav_clear_selected_set".into(),
        format!("clear_attribute {}", attribute),
    ]);
}

fn to_strings(commands: &[&str]) -> Vec<String> {
    commands.iter().map(|c| c.to_string()).collect()
}

/// Builds the chain of `navgenNNN` aliases; each press of the bind key runs
/// one step and rebinds the key to the next.
///
/// Start and finale areas need exactly two `info_null` corner markers each
/// (named `start` and `finale`); every `walkable` marker seeds the walkable
/// mesh.
pub fn navmesh_script(document: &Document) -> String {
    let mut lines: Vec<Vec<String>> = vec![to_strings(&[
        "sv_cheats 1",
        "z_debug 1",
        "director_stop",
        "nb_delete_all",
        "nav_edit 1",
    ])];

    for (targetname, attribute) in [("start", "PLAYER_START"), ("finale", "FINALE")] {
        let corners = markers(document, targetname);
        if corners.len() == 2 {
            attribute_area(&mut lines, &corners, attribute);
        } else {
            warn!(
                "Need 2 corners for {} nav mesh, got {} instead",
                attribute,
                corners.len()
            );
        }
    }

    let walkables = markers(document, "walkable");
    debug!("{} walkable markers", walkables.len());
    for walkable in walkables {
        lines.push(vec![setpos(walkable), "setang 90 0 0".into()]);
        lines.push(to_strings(&["nav_mark_walkable"]));
    }
    lines.push(to_strings(&["nav_generate_incremental"]));
    lines.push(to_strings(&["nav_analyze"]));
    lines.push(to_strings(&["nav_save"]));
    lines.push(to_strings(&["director_start", "sv_cheats 0"]));

    let mut out = format!("bind {} navgen000\n", BIND_KEY);
    for (num, line) in lines.iter().enumerate() {
        out.push_str(&format!(
            "alias \"navgen{:03}\" \"{};bind {} navgen{:03}\"\n",
            num,
            line.join(";"),
            BIND_KEY,
            num + 1
        ));
    }
    out.push_str(&format!("alias \"navgen{:03}\" \"echo Finished\"\n", lines.len()));
    out
}
