// core/src/shell.rs

//! Route table and header menu shared by every page.

/// Every page the desk serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
  Carts,
  Transfer,
  Logs,
  UserHome,
  UserBorrow,
  UserReturn,
  BorrowResult,
  ReturnResult,
}

/// Where a requested path ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
  Page(Route),
  /// Unknown path; send the browser here instead.
  Redirect(Route),
}

pub const ADMIN_TITLE: &str = "小推车管理后台";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
  pub key: &'static str,
  pub label: &'static str,
  pub route: Route,
}

pub const ADMIN_MENU: [MenuItem; 3] = [
  MenuItem { key: "carts", label: "小推车管理", route: Route::Carts },
  MenuItem { key: "transfer", label: "搬运小推车", route: Route::Transfer },
  MenuItem { key: "logs", label: "日志查询", route: Route::Logs },
];

impl Route {
  pub const ALL: [Route; 8] = [
    Route::Carts,
    Route::Transfer,
    Route::Logs,
    Route::UserHome,
    Route::UserBorrow,
    Route::UserReturn,
    Route::BorrowResult,
    Route::ReturnResult,
  ];

  pub fn path(&self) -> &'static str {
    match self {
      Route::Carts => "/carts",
      Route::Transfer => "/transfer",
      Route::Logs => "/logs",
      Route::UserHome => "/user",
      Route::UserBorrow => "/user/borrow",
      Route::UserReturn => "/user/return",
      Route::BorrowResult => "/result/borrow",
      Route::ReturnResult => "/result/return",
    }
  }

  /// Exact match, ignoring one trailing slash. Everything else falls back to
  /// the admin cart list.
  pub fn resolve(path: &str) -> Resolution {
    let trimmed = match path.strip_suffix('/') {
      Some(rest) if !rest.is_empty() => rest,
      _ => path,
    };
    match Route::ALL.iter().find(|r| r.path() == trimmed) {
      Some(route) => Resolution::Page(*route),
      None => Resolution::Redirect(Route::Carts),
    }
  }

  pub fn is_user_facing(&self) -> bool {
    is_user_facing_path(self.path())
  }

  pub fn title(&self) -> &'static str {
    match self {
      Route::Carts => "小推车管理",
      Route::Transfer => "搬运小推车",
      Route::Logs => "操作日志",
      Route::UserHome => "借还小推车",
      Route::UserBorrow => "用户借用",
      Route::UserReturn => "用户归还",
      Route::BorrowResult => "借用成功",
      Route::ReturnResult => "归还成功",
    }
  }
}

/// End-user and result pages render without the admin header and menu.
pub fn is_user_facing_path(path: &str) -> bool {
  path.starts_with("/user") || path.starts_with("/result")
}

/// The admin menu for `path`, or nothing on end-user pages.
pub fn header_menu(path: &str) -> Option<&'static [MenuItem]> {
  if is_user_facing_path(path) {
    None
  } else {
    Some(&ADMIN_MENU)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolves_known_paths_and_redirects_unknown() {
    assert_eq!(Route::resolve("/carts"), Resolution::Page(Route::Carts));
    assert_eq!(Route::resolve("/user/borrow/"), Resolution::Page(Route::UserBorrow));
    assert_eq!(Route::resolve("/result/return"), Resolution::Page(Route::ReturnResult));
    assert_eq!(Route::resolve("/"), Resolution::Redirect(Route::Carts));
    assert_eq!(Route::resolve("/nope"), Resolution::Redirect(Route::Carts));
    assert_eq!(Route::resolve("/carts/extra"), Resolution::Redirect(Route::Carts));
  }

  #[test]
  fn header_hidden_on_user_and_result_pages() {
    for route in Route::ALL {
      let expect_user = matches!(
        route,
        Route::UserHome | Route::UserBorrow | Route::UserReturn | Route::BorrowResult | Route::ReturnResult
      );
      assert_eq!(route.is_user_facing(), expect_user, "{:?}", route);
      assert_eq!(header_menu(route.path()).is_none(), expect_user);
    }
    assert_eq!(header_menu("/logs").map(|m| m.len()), Some(3));
  }
}
