use admin_listing::{Navigation, Page, Result, WidgetConfig, markers};

const ACCOUNT_LISTING: &str = r#"
<!DOCTYPE html>
<html>
<head>
  <title>Manage accounts</title>
</head>
<body>
  <header>
    <h1 id="page-title">Manage accounts</h1>
    <form method="get" action=".">
      <input type="text" name="q" id="search" placeholder="Search accounts">
    </form>
  </header>
  <form id="listing" method="post">
    <select id="sort-bulk-edit" data-bulk-action disabled>
      <option value="">Bulk update</option>
      <option value="/admin/accounts/bulk-edit/">Edit selected accounts</option>
    </select>
    <select id="sort-stage">
      <option value="">Move to stage</option>
      <option value="/admin/accounts/?stage=live">Live</option>
      <option value="/admin/accounts/?stage=draft">Draft</option>
    </select>
    <table>
      <tr>
        <th><input type="checkbox" data-bulk-select-all id="select-all"></th>
        <th>Account</th>
      </tr>
      <tr>
        <td><input type="checkbox" data-bulk-update name="account" value="101" id="row-1"></td>
        <td><label for="row-1">Ada Lovelace</label></td>
      </tr>
      <tr>
        <td><input type="checkbox" data-bulk-update name="account" value="102" id="row-2"></td>
        <td><label for="row-2">Grace Hopper</label></td>
      </tr>
      <tr>
        <td><input type="checkbox" data-bulk-update name="account" value="103" id="row-3"></td>
        <td><label for="row-3">Mary Shelley</label></td>
      </tr>
    </table>
    <input data-autocomplete id="tags">
  </form>
</body>
</html>
"#;

#[test]
fn full_listing_page_wires_all_behaviors() -> Result<()> {
    let page = Page::from_html(ACCOUNT_LISTING)?;

    page.assert_text("#page-title", "Manage accounts")?;
    page.assert_disabled("#sort-bulk-edit", true)?;
    page.assert_text("#sort-bulk-edit option", markers::MENU_DEFAULT_LABEL)?;
    page.assert_checked("#select-all", false)?;
    page.assert_value("#sort-stage", "")?;

    assert_eq!(page.location(), "about:blank");
    assert!(page.navigations().is_empty());
    assert_eq!(page.widget_attachments().len(), 1);
    assert_eq!(page.widget_attachments()[0].element, "#tags");
    Ok(())
}

#[test]
fn three_checkbox_scenario_drives_the_menu_label() -> Result<()> {
    let mut page = Page::from_html(ACCOUNT_LISTING)?;

    page.set_checked("#row-1", true)?;
    page.assert_disabled("#sort-bulk-edit", false)?;
    page.assert_text("#sort-bulk-edit option", markers::MENU_SELECTED_LABEL)?;

    page.set_checked("#row-2", true)?;
    page.assert_disabled("#sort-bulk-edit", false)?;
    page.assert_text("#sort-bulk-edit option", markers::MENU_SELECTED_LABEL)?;

    page.set_checked("#row-1", false)?;
    page.assert_disabled("#sort-bulk-edit", false)?;
    page.assert_text("#sort-bulk-edit option", markers::MENU_SELECTED_LABEL)?;

    page.set_checked("#row-2", false)?;
    page.assert_disabled("#sort-bulk-edit", true)?;
    page.assert_text("#sort-bulk-edit option", markers::MENU_DEFAULT_LABEL)?;
    Ok(())
}

#[test]
fn select_all_forces_rows_without_refreshing_menus() -> Result<()> {
    let mut page = Page::from_html(ACCOUNT_LISTING)?;

    page.set_checked("#select-all", true)?;
    page.assert_checked("#row-1", true)?;
    page.assert_checked("#row-2", true)?;
    page.assert_checked("#row-3", true)?;
    page.assert_disabled("#sort-bulk-edit", true)?;
    page.assert_text("#sort-bulk-edit option", markers::MENU_DEFAULT_LABEL)?;

    page.set_checked("#select-all", false)?;
    page.assert_checked("#row-1", false)?;
    page.assert_checked("#row-2", false)?;
    page.assert_checked("#row-3", false)?;
    page.assert_disabled("#sort-bulk-edit", true)?;
    Ok(())
}

#[test]
fn row_change_after_select_all_catches_the_menus_up() -> Result<()> {
    let mut page = Page::from_html(ACCOUNT_LISTING)?;

    page.set_checked("#select-all", true)?;
    page.assert_disabled("#sort-bulk-edit", true)?;

    page.set_checked("#row-1", false)?;
    page.assert_disabled("#sort-bulk-edit", false)?;
    page.assert_text("#sort-bulk-edit option", markers::MENU_SELECTED_LABEL)?;

    page.set_checked("#row-2", false)?;
    page.set_checked("#row-3", false)?;
    page.assert_disabled("#sort-bulk-edit", true)?;
    page.assert_text("#sort-bulk-edit option", markers::MENU_DEFAULT_LABEL)?;
    Ok(())
}

#[test]
fn rerunning_select_all_keeps_the_same_row_state() -> Result<()> {
    let mut page = Page::from_html(ACCOUNT_LISTING)?;

    page.click("#select-all")?;
    page.set_checked("#row-2", false)?;

    page.dispatch("#select-all", "change")?;
    let first_run = [
        page.checked("#row-1")?,
        page.checked("#row-2")?,
        page.checked("#row-3")?,
    ];
    assert_eq!(first_run, [true, true, true]);

    page.dispatch("#select-all", "change")?;
    let second_run = [
        page.checked("#row-1")?,
        page.checked("#row-2")?,
        page.checked("#row-3")?,
    ];
    assert_eq!(second_run, first_run);

    page.set_checked("#select-all", false)?;
    page.dispatch("#select-all", "change")?;
    page.assert_checked("#row-1", false)?;
    page.assert_checked("#row-2", false)?;
    page.assert_checked("#row-3", false)?;
    Ok(())
}

#[test]
fn clicking_rows_toggles_selection_like_a_user() -> Result<()> {
    let mut page = Page::from_html(ACCOUNT_LISTING)?;

    page.click("#row-2")?;
    page.assert_checked("#row-2", true)?;
    page.assert_disabled("#sort-bulk-edit", false)?;

    page.click("#row-2")?;
    page.assert_checked("#row-2", false)?;
    page.assert_disabled("#sort-bulk-edit", true)?;
    Ok(())
}

#[test]
fn bulk_edit_choice_navigates_from_the_listing_url() -> Result<()> {
    let mut page = Page::from_html_with_url("/admin/accounts/", ACCOUNT_LISTING)?;

    page.set_checked("#row-3", true)?;
    page.select_option("#sort-bulk-edit", "/admin/accounts/bulk-edit/")?;

    assert_eq!(page.location(), "/admin/accounts/bulk-edit/");
    assert_eq!(
        page.navigations(),
        &[Navigation {
            from: "/admin/accounts/".into(),
            to: "/admin/accounts/bulk-edit/".into(),
        }]
    );
    Ok(())
}

#[test]
fn stage_menu_navigates_even_with_an_empty_value() -> Result<()> {
    let mut page = Page::from_html_with_url("/admin/accounts/", ACCOUNT_LISTING)?;

    page.dispatch("#sort-stage", "change")?;
    assert_eq!(page.location(), "");
    assert_eq!(
        page.navigations(),
        &[Navigation {
            from: "/admin/accounts/".into(),
            to: "".into(),
        }]
    );

    page.select_option("#sort-stage", "/admin/accounts/?stage=live")?;
    assert_eq!(page.location(), "/admin/accounts/?stage=live");
    assert_eq!(page.navigations().len(), 2);
    assert_eq!(page.navigations()[1].from, "");
    Ok(())
}

#[test]
fn radio_driven_conditional_field_follows_the_checked_state() -> Result<()> {
    let mut page = Page::from_html(
        r#"
        <div data-conditional-field id="leave-policy">
          <fieldset>
            <input type="radio" name="leave" value="yes" id="leave-yes">
            <label for="leave-yes">Yes</label>
            <input type="radio" name="leave" value="no" id="leave-no" checked>
            <label for="leave-no">No</label>
          </fieldset>
          <div class="conditional-field d-none" id="leave-details">
            <input type="text" name="leave-date" id="leave-date">
          </div>
        </div>
        "#,
    )?;

    page.assert_has_class("#leave-details", markers::HIDDEN_CLASS, true)?;

    page.click("#leave-yes")?;
    page.assert_checked("#leave-yes", true)?;
    page.assert_checked("#leave-no", false)?;
    page.assert_has_class("#leave-details", markers::HIDDEN_CLASS, false)?;

    page.click("#leave-no")?;
    page.assert_checked("#leave-yes", false)?;
    page.assert_has_class("#leave-details", markers::HIDDEN_CLASS, true)?;

    // Re-clicking the checked radio fires no change, so nothing moves.
    page.click("#leave-no")?;
    page.assert_has_class("#leave-details", markers::HIDDEN_CLASS, true)?;
    Ok(())
}

#[test]
fn ungrouped_conditional_containers_share_the_page_group() -> Result<()> {
    let mut page = Page::from_html(
        r#"
        <div data-conditional-field id="alpha">
          <input type="checkbox" id="alpha-toggle" checked>
          <div class="conditional-field" id="alpha-panel">Alpha</div>
        </div>
        <div data-conditional-field id="beta">
          <input type="checkbox" id="beta-toggle">
          <div class="conditional-field d-none" id="beta-panel">Beta</div>
        </div>
        "#,
    )?;

    page.assert_has_class("#alpha-panel", markers::HIDDEN_CLASS, false)?;

    page.set_checked("#beta-toggle", true)?;
    page.assert_has_class("#alpha-panel", markers::HIDDEN_CLASS, true)?;
    page.assert_has_class("#beta-panel", markers::HIDDEN_CLASS, false)?;
    Ok(())
}

#[test]
fn grouped_conditional_containers_stay_independent() -> Result<()> {
    let mut page = Page::from_html(
        r#"
        <div data-conditional-field data-conditional-group="notices" id="alpha">
          <input type="checkbox" id="alpha-toggle" checked>
          <div class="conditional-field" id="alpha-panel">Alpha</div>
        </div>
        <div data-conditional-field data-conditional-group="billing" id="beta">
          <input type="checkbox" id="beta-toggle">
          <div class="conditional-field d-none" id="beta-panel">Beta</div>
        </div>
        "#,
    )?;

    page.set_checked("#beta-toggle", true)?;
    page.assert_has_class("#alpha-panel", markers::HIDDEN_CLASS, false)?;
    page.assert_has_class("#beta-panel", markers::HIDDEN_CLASS, false)?;

    page.set_checked("#beta-toggle", false)?;
    page.assert_has_class("#alpha-panel", markers::HIDDEN_CLASS, false)?;
    page.assert_has_class("#beta-panel", markers::HIDDEN_CLASS, true)?;
    Ok(())
}

#[test]
fn autocomplete_attachments_record_the_fixed_config() -> Result<()> {
    let page = Page::from_html(
        r#"
        <input data-autocomplete id="tags">
        <select data-autocomplete>
          <option>London</option>
        </select>
        "#,
    )?;

    let attachments = page.widget_attachments();
    assert_eq!(attachments.len(), 2);
    assert_eq!(attachments[0].element, "#tags");
    assert_eq!(attachments[1].element, "select");

    let config = &attachments[0].config;
    assert_eq!(config, &WidgetConfig::default());
    assert!(config.allow_html);
    assert_eq!(config.search_fields, vec!["value".to_string()]);
    assert_eq!(config.placeholder_value, "Add an item");
    assert_eq!(config.search_placeholder_value, "This is a search placeholder");
    assert!(config.remove_item_button);
    Ok(())
}

#[test]
fn menus_only_gate_on_marked_checkboxes() -> Result<()> {
    let mut page = Page::from_html(ACCOUNT_LISTING)?;

    // The search box and select-all master are not [data-bulk-update]; the
    // menus keep waiting for a real row.
    page.type_text("#search", "lovelace")?;
    page.assert_disabled("#sort-bulk-edit", true)?;

    page.set_checked("#select-all", true)?;
    page.assert_disabled("#sort-bulk-edit", true)?;
    Ok(())
}
