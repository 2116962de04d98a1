use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;

use super::profiles::{self, Profile, StoreError};
use super::state::{AppState, PopupPhase};

// Stays alive across page changes; only ever toggled visible.
pub(super) fn build_popup_layer(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let veil = gtk::Box::new(gtk::Orientation::Vertical, 0);
    veil.add_css_class("popup-veil");
    veil.set_visible(false);

    let card = gtk::Box::new(gtk::Orientation::Vertical, 12);
    card.add_css_class("register-popup");
    card.set_halign(gtk::Align::Center);
    card.set_valign(gtk::Align::Center);
    card.set_vexpand(true);

    let title = gtk::Label::new(Some("Register player"));
    title.add_css_class("popup-title");
    title.set_xalign(0.0);
    card.append(&title);

    let name = gtk::Entry::new();
    name.set_placeholder_text(Some("Name"));
    card.append(&form_row("Name", &name));

    let surname = gtk::Entry::new();
    surname.set_placeholder_text(Some("Surname"));
    card.append(&form_row("Surname", &surname));

    let email = gtk::Entry::new();
    email.set_placeholder_text(Some("name@example.com"));
    email.set_input_purpose(gtk::InputPurpose::Email);
    card.append(&form_row("Email", &email));

    let actions = gtk::Box::new(gtk::Orientation::Horizontal, 8);
    actions.set_halign(gtk::Align::End);

    let cancel = gtk::Button::with_label("Cancel");
    let state_for_cancel = state.clone();
    cancel.connect_clicked(move |_| {
        if let Some(popup) = &state_for_cancel.borrow().popup_box {
            popup.set_visible(false);
        }
    });
    actions.append(&cancel);

    let add = gtk::Button::with_label("Add player");
    add.add_css_class("suggested-action");
    let state_for_add = state.clone();
    add.connect_clicked(move |_| {
        submit_registration(&state_for_add);
    });
    actions.append(&add);
    card.append(&actions);

    veil.append(&card);

    let mut st = state.borrow_mut();
    st.popup_box = Some(veil.clone());
    st.name_entry = Some(name);
    st.surname_entry = Some(surname);
    st.email_entry = Some(email);
    veil
}

fn form_row(label: &str, entry: &gtk::Entry) -> gtk::Box {
    let row = gtk::Box::new(gtk::Orientation::Vertical, 4);
    row.add_css_class("form-row");
    let name = gtk::Label::new(Some(label));
    name.set_xalign(0.0);
    row.append(&name);
    row.append(entry);
    row
}

pub(super) fn show_registration_popup(state: &Rc<RefCell<AppState>>) {
    let st = state.borrow();
    if let Some(popup) = &st.popup_box {
        popup.set_visible(true);
    }
    if let Some(name) = &st.name_entry {
        name.grab_focus();
    }
}

// A missing handle reads as an empty field, not a stale value.
pub(super) fn capture_profile_fields(st: &mut AppState) {
    st.user_data.name = entry_text(&st.name_entry);
    st.user_data.surname = entry_text(&st.surname_entry);
    st.user_data.mail = entry_text(&st.email_entry);
}

fn entry_text(entry: &Option<gtk::Entry>) -> String {
    entry
        .as_ref()
        .map(|e| e.text().to_string())
        .unwrap_or_default()
}

pub(super) fn persist_profile(st: &mut AppState) -> Result<u32, StoreError> {
    let profile = Profile {
        name: st.user_data.name.clone(),
        surname: st.user_data.surname.clone(),
        email: st.user_data.mail.clone(),
        created: profiles::now_date_label(),
    };
    st.profile_store.add(profile)
}

fn submit_registration(state: &Rc<RefCell<AppState>>) {
    let result = {
        let mut st = state.borrow_mut();
        capture_profile_fields(&mut st);
        persist_profile(&mut st)
    };
    match result {
        Ok(key) => eprintln!("[Profiles] registered player with key {key}"),
        Err(err) => eprintln!("[Profiles] {err}"),
    }

    // The phase advances whether or not the write landed; the log is the
    // only record of the outcome.
    let mut st = state.borrow_mut();
    st.popup_phase = st.popup_phase.advanced();
    apply_popup_phase(&st);
    if let Some(popup) = &st.popup_box {
        popup.set_visible(false);
    }
}

pub(super) fn apply_popup_phase(st: &AppState) {
    let ready = st.popup_phase == PopupPhase::Ready;
    if let Some(button) = &st.register_button {
        button.set_visible(!ready);
    }
    if let Some(link) = &st.play_link {
        link.set_visible(ready);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use temp_dir::TempDir;

    use super::super::profiles::ProfileStore;

    #[test]
    fn capture_with_missing_handles_empties_the_fields() {
        let mut st = AppState::new();
        st.user_data.name = "stale".to_string();
        st.user_data.surname = "stale".to_string();
        st.user_data.mail = "stale".to_string();

        capture_profile_fields(&mut st);

        assert_eq!(st.user_data.name, "");
        assert_eq!(st.user_data.surname, "");
        assert_eq!(st.user_data.mail, "");
    }

    #[test]
    fn persist_stores_the_captured_fields() {
        let dir = TempDir::new().unwrap();
        let mut st = AppState::new();
        st.profile_store = ProfileStore::open(dir.child("profiles.json"));
        st.user_data.name = "Ada".to_string();
        st.user_data.surname = "Lovelace".to_string();
        st.user_data.mail = "ada@example.com".to_string();

        let key = persist_profile(&mut st).unwrap();

        assert_eq!(key, 1);
        let entry = &st.profile_store.profiles()[0];
        assert_eq!(entry.profile.name, "Ada");
        assert_eq!(entry.profile.surname, "Lovelace");
        assert_eq!(entry.profile.email, "ada@example.com");
        assert!(!entry.profile.created.is_empty());
    }

    #[test]
    fn a_failed_persist_changes_neither_user_data_nor_store() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.child("blocker");
        fs::write(&blocker, b"plain file").unwrap();

        let mut st = AppState::new();
        st.profile_store = ProfileStore::open(blocker.join("profiles.json"));
        st.user_data.name = "Ada".to_string();
        st.user_data.mail = "ada@example.com".to_string();
        let before = st.user_data.clone();

        assert!(persist_profile(&mut st).is_err());
        assert_eq!(st.user_data, before);
        assert!(st.profile_store.profiles().is_empty());
    }

    #[test]
    fn a_failed_store_write_still_advances_the_registration_phase() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.child("blocker");
        fs::write(&blocker, b"plain file").unwrap();

        let state = Rc::new(RefCell::new(AppState::new()));
        state.borrow_mut().profile_store = ProfileStore::open(blocker.join("profiles.json"));

        submit_registration(&state);
        assert_eq!(state.borrow().popup_phase, PopupPhase::Ready);
        assert!(state.borrow().profile_store.profiles().is_empty());

        submit_registration(&state);
        assert_eq!(state.borrow().popup_phase, PopupPhase::Ready);
    }
}
